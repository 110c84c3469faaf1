use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::{BinaryCrossEntropyLossConfig, CrossEntropyLossConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{sigmoid, softmax},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Head selection ───────────────────────────────────────────────────────────
/// Classification head layout.
///   SingleLogit → 1 output, sigmoid, BCE-with-logits
///   TwoClass    → 2 outputs, softmax, cross-entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadKind {
    SingleLogit,
    TwoClass,
}

impl HeadKind {
    pub fn num_outputs(self) -> usize {
        match self {
            HeadKind::SingleLogit => 1,
            HeadKind::TwoClass    => 2,
        }
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl EncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TextEncoder {
            token_embedding, position_embedding, layers, final_norm, dropout,
            d_model: self.d_model,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

// ─── Classifier spec ──────────────────────────────────────────────────────────
/// Everything needed to rebuild a classifier before loading its weights.
/// Persisted as model_config.json next to the checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSpec {
    pub encoder:   EncoderConfig,
    pub head:      HeadKind,
    /// Class index → class name, as found in pretrained model configs.
    pub label_map: BTreeMap<usize, String>,
}

impl ClassifierSpec {
    pub fn new(encoder: EncoderConfig, head: HeadKind) -> Self {
        Self { encoder, head, label_map: default_label_map() }
    }

    /// Generic encoder with a two-class head, used when no trained model loads.
    pub fn generic() -> Self {
        Self::new(EncoderConfig::new(30522, 512, 256, 8, 6, 1024, 0.1), HeadKind::TwoClass)
    }

    pub fn ai_class_index(&self) -> usize {
        ai_class_index(&self.label_map)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> DetectorModel<B> {
        let encoder = self.encoder.init(device);
        self.with_encoder(encoder, device)
    }

    /// Attach a freshly initialised head to an existing encoder.
    pub fn with_encoder<B: Backend>(&self, encoder: TextEncoder<B>, device: &B::Device) -> DetectorModel<B> {
        let num_outputs = self.head.num_outputs();
        let head     = LinearConfig::new(self.encoder.d_model, num_outputs).init(device);
        let dropout  = DropoutConfig::new(self.encoder.dropout).init();
        let ai_index = self.ai_class_index().min(num_outputs - 1);
        DetectorModel { encoder, head, dropout, num_outputs, ai_index }
    }
}

pub fn default_label_map() -> BTreeMap<usize, String> {
    BTreeMap::from([(0, "human".to_string()), (1, "ai".to_string())])
}

/// Index of the class whose name marks AI text ("AI", "ai-generated",
/// "generated", ...). Defaults to 1 when no name matches.
pub fn ai_class_index(label_map: &BTreeMap<usize, String>) -> usize {
    label_map
        .iter()
        .find(|(_, name)| {
            let lower = name.to_lowercase();
            lower.contains("generated")
                || lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "ai")
        })
        .map(|(idx, _)| *idx)
        .unwrap_or(1)
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// pad_mask: [batch, seq_len], true where the position is padding
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let input = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub dropout:            Dropout,
    pub d_model:            usize,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids, attention_mask: [batch, seq_len] → hidden: [batch, seq_len, d_model]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, attention_mask: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let pad_mask = attention_mask.equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x, pad_mask.clone());
        }
        self.final_norm.forward(x)
    }
}

/// Mean of the hidden states over real (mask = 1) positions.
/// hidden: [batch, seq_len, d_model], mask: [batch, seq_len] → [batch, d_model]
pub fn masked_mean<B: Backend>(hidden: Tensor<B, 3>, attention_mask: Tensor<B, 2, Int>) -> Tensor<B, 2> {
    let [batch_size, seq_len, d_model] = hidden.dims();
    let mask = attention_mask
        .float()
        .unsqueeze_dim::<3>(2)
        .expand([batch_size, seq_len, d_model]);
    let summed = (hidden * mask.clone()).sum_dim(1).reshape([batch_size, d_model]);
    let counts = mask.sum_dim(1).reshape([batch_size, d_model]).clamp_min(1e-9);
    summed / counts
}

// ─── Classifier ───────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct DetectorModel<B: Backend> {
    pub encoder:     TextEncoder<B>,
    pub head:        Linear<B>,
    pub dropout:     Dropout,
    pub num_outputs: usize,
    pub ai_index:    usize,
}

impl<B: Backend> DetectorModel<B> {
    /// → logits: [batch, num_outputs]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>, attention_mask: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let hidden = self.encoder.forward(input_ids, attention_mask.clone());
        let pooled = masked_mean(hidden, attention_mask);
        self.head.forward(self.dropout.forward(pooled))
    }

    /// BCE for a single logit, cross-entropy for two classes.
    /// `labels` are AI flags (1 = AI); they are mapped onto the AI class index.
    pub fn loss(&self, logits: Tensor<B, 2>, labels: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        let device = logits.device();
        if self.num_outputs == 1 {
            let [batch_size, _] = logits.dims();
            BinaryCrossEntropyLossConfig::new()
                .with_logits(true)
                .init(&device)
                .forward(logits.reshape([batch_size]), labels)
        } else {
            let targets = if self.ai_index == 1 {
                labels
            } else {
                labels.mul_scalar(-1).add_scalar(1)
            };
            CrossEntropyLossConfig::new().init(&device).forward(logits, targets)
        }
    }

    /// P(AI) per sample: sigmoid of the single logit, or the softmax
    /// mass on the AI class. → [batch]
    pub fn ai_probabilities(&self, logits: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch_size, _] = logits.dims();
        if self.num_outputs == 1 {
            sigmoid(logits).reshape([batch_size])
        } else {
            let ai = self.ai_index;
            softmax(logits, 1)
                .slice([0..batch_size, ai..ai + 1])
                .reshape([batch_size])
        }
    }
}

/// Count samples whose thresholded prediction (P(AI) ≥ 0.5) matches the AI flag.
pub fn correct_predictions<B: Backend>(ai_probs: Tensor<B, 1>, labels: Tensor<B, 1, Int>) -> usize {
    let predicted = ai_probs.greater_equal_elem(0.5).int();
    predicted.equal(labels).int().sum().into_scalar().elem::<i64>() as usize
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_spec(head: HeadKind) -> ClassifierSpec {
        ClassifierSpec::new(EncoderConfig::new(64, 8, 16, 2, 1, 32, 0.0), head)
    }

    fn inputs(device: &<TestBackend as Backend>::Device) -> (Tensor<TestBackend, 2, Int>, Tensor<TestBackend, 2, Int>) {
        let ids  = Tensor::<TestBackend, 1, Int>::from_ints([1, 5, 6, 2, 0, 0, 0, 0, 1, 7, 8, 9, 10, 11, 12, 2].as_slice(), device)
            .reshape([2, 8]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1].as_slice(), device)
            .reshape([2, 8]);
        (ids, mask)
    }

    #[test]
    fn test_ai_class_index_from_label_map() {
        let m = |pairs: &[(usize, &str)]| -> BTreeMap<usize, String> {
            pairs.iter().map(|(i, n)| (*i, n.to_string())).collect()
        };
        assert_eq!(ai_class_index(&m(&[(0, "AI-generated"), (1, "human")])), 0);
        assert_eq!(ai_class_index(&m(&[(0, "human"), (1, "AI")])), 1);
        assert_eq!(ai_class_index(&m(&[(0, "Generated"), (1, "Real")])), 0);
        assert_eq!(ai_class_index(&m(&[(0, "LABEL_0"), (1, "LABEL_1")])), 1);
        // "said" must not be read as "ai"
        assert_eq!(ai_class_index(&m(&[(0, "said"), (1, "other")])), 1);
        assert_eq!(ai_class_index(&BTreeMap::new()), 1);
    }

    #[test]
    fn test_forward_shapes_per_head() {
        let device = Default::default();
        let (ids, mask) = inputs(&device);
        for (head, outputs) in [(HeadKind::SingleLogit, 1), (HeadKind::TwoClass, 2)] {
            let model: DetectorModel<TestBackend> = tiny_spec(head).init(&device);
            let logits = model.forward(ids.clone(), mask.clone());
            assert_eq!(logits.dims(), [2, outputs]);
            assert_eq!(model.ai_probabilities(logits).dims(), [2]);
        }
    }

    #[test]
    fn test_probabilities_are_in_unit_interval() {
        let device = Default::default();
        let (ids, mask) = inputs(&device);
        for head in [HeadKind::SingleLogit, HeadKind::TwoClass] {
            let model: DetectorModel<TestBackend> = tiny_spec(head).init(&device);
            let probs: Vec<f32> = model
                .ai_probabilities(model.forward(ids.clone(), mask.clone()))
                .into_data()
                .to_vec::<f32>()
                .unwrap();
            assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        }
    }

    #[test]
    fn test_loss_is_finite_for_both_heads() {
        let device = Default::default();
        let (ids, mask) = inputs(&device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([0, 1].as_slice(), &device);
        for head in [HeadKind::SingleLogit, HeadKind::TwoClass] {
            let model: DetectorModel<TestBackend> = tiny_spec(head).init(&device);
            let loss = model.loss(model.forward(ids.clone(), mask.clone()), labels.clone());
            let v = loss.into_scalar().elem::<f64>();
            assert!(v.is_finite() && v >= 0.0);
        }
    }

    #[test]
    fn test_masked_mean_ignores_padding() {
        let device = Default::default();
        let hidden = Tensor::<TestBackend, 1>::from_floats([1.0, 3.0, 100.0].as_slice(), &device)
            .reshape([1, 3, 1]);
        let mask = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 0].as_slice(), &device)
            .reshape([1, 3]);
        let pooled: Vec<f32> = masked_mean(hidden, mask).into_data().to_vec::<f32>().unwrap();
        assert_eq!(pooled, vec![2.0]);
    }

    #[test]
    fn test_correct_predictions_threshold() {
        let device = Default::default();
        let probs  = Tensor::<TestBackend, 1>::from_floats([0.5, 0.49, 0.9, 0.1].as_slice(), &device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 1, 0].as_slice(), &device);
        assert_eq!(correct_predictions(probs, labels), 3);
    }
}
