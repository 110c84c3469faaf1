// ============================================================
// Layer 4: Stratified Sampler
// ============================================================
// Draws a fixed-size, label-balanced subset from a large corpus
// so expensive datasets can be trained on quickly.
//
//   per_label  records from Human
//   per_label  records from AI
//   unlabeled  records from the unlabelled remainder pool
//
// Each pool is shuffled with its own draw from one seeded
// ChaCha8Rng, so a fixed seed gives the same subset on every
// run and every platform.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::record::{Label, TextRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSpec {
    pub per_label: usize,
    pub unlabeled: usize,
    pub seed:      u64,
}

/// Draw a stratified sample. Pools smaller than requested are taken whole.
/// Output order: Human draws, then AI draws, then unlabelled draws.
pub fn stratified_sample(records: Vec<TextRecord>, spec: SampleSpec) -> Vec<TextRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

    let mut human     = Vec::new();
    let mut ai        = Vec::new();
    let mut unlabeled = Vec::new();
    for r in records {
        match r.label {
            Some(Label::Human) => human.push(r),
            Some(Label::Ai)    => ai.push(r),
            None               => unlabeled.push(r),
        }
    }

    let mut out = Vec::with_capacity(2 * spec.per_label + spec.unlabeled);
    for (pool, take) in [
        (human, spec.per_label),
        (ai, spec.per_label),
        (unlabeled, spec.unlabeled),
    ] {
        out.extend(draw(pool, take, &mut rng));
    }

    tracing::info!(
        "Stratified sample: {} records (per_label={}, unlabeled={}, seed={})",
        out.len(),
        spec.per_label,
        spec.unlabeled,
        spec.seed
    );
    out
}

fn draw(mut pool: Vec<TextRecord>, take: usize, rng: &mut ChaCha8Rng) -> Vec<TextRecord> {
    pool.shuffle(rng);
    pool.truncate(take);
    pool
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<TextRecord> {
        let mut v = Vec::new();
        for i in 0..50 {
            v.push(TextRecord::labelled(format!("human {i}"), Label::Human));
            v.push(TextRecord::labelled(format!("ai {i}"), Label::Ai));
        }
        for i in 0..20 {
            v.push(TextRecord::new(format!("unknown {i}"), None));
        }
        v
    }

    fn spec(seed: u64) -> SampleSpec {
        SampleSpec { per_label: 10, unlabeled: 5, seed }
    }

    #[test]
    fn test_counts_per_stratum() {
        let s = stratified_sample(corpus(), spec(7));
        assert_eq!(s.len(), 25);
        assert_eq!(s.iter().filter(|r| r.label == Some(Label::Human)).count(), 10);
        assert_eq!(s.iter().filter(|r| r.label == Some(Label::Ai)).count(), 10);
        assert_eq!(s.iter().filter(|r| r.label.is_none()).count(), 5);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        assert_eq!(stratified_sample(corpus(), spec(42)), stratified_sample(corpus(), spec(42)));
    }

    #[test]
    fn test_different_seed_changes_draw() {
        assert_ne!(stratified_sample(corpus(), spec(1)), stratified_sample(corpus(), spec(2)));
    }

    #[test]
    fn test_small_pools_are_taken_whole() {
        let records = vec![
            TextRecord::labelled("only human", Label::Human),
            TextRecord::new("only unlabeled", None),
        ];
        let s = stratified_sample(records, spec(3));
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].label, Some(Label::Human));
        assert_eq!(s[1].label, None);
    }
}
