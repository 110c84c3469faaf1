// ============================================================
// Layer 5: Early Stopping
// ============================================================
// Tracks the best validation loss across epochs.
//
//   loss < best      → Improved (counter reset, keep this model)
//   otherwise        → counter += 1
//   counter == patience → Stop
//
// With patience 3 and a loss that never improves after epoch 1,
// training stops at the end of epoch 4.

pub const DEFAULT_PATIENCE: usize = 3;

/// Train loss this far below validation loss is reported as overfitting.
pub const OVERFIT_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    Improved,
    Stalled { stale_epochs: usize },
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:     usize,
    best_loss:    f64,
    best_epoch:   Option<usize>,
    stale_epochs: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience:     patience.max(1),
            best_loss:    f64::INFINITY,
            best_epoch:   None,
            stale_epochs: 0,
        }
    }

    /// Record one epoch's validation loss. NaN never counts as an improvement.
    pub fn observe(&mut self, epoch: usize, loss: f64) -> Progress {
        if loss < self.best_loss {
            self.best_loss    = loss;
            self.best_epoch   = Some(epoch);
            self.stale_epochs = 0;
            return Progress::Improved;
        }

        self.stale_epochs += 1;
        if self.stale_epochs >= self.patience {
            Progress::Stop
        } else {
            Progress::Stalled { stale_epochs: self.stale_epochs }
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

impl Default for EarlyStopping {
    fn default() -> Self {
        Self::new(DEFAULT_PATIENCE)
    }
}

/// Early stopping plus the model from the best epoch so far.
///
/// The training loop offers every epoch's validated model; only an
/// improving epoch replaces the kept one.
#[derive(Debug)]
pub struct ModelSelection<M> {
    stopper:       EarlyStopping,
    best:          Option<M>,
    epochs_run:    usize,
    stopped_early: bool,
}

impl<M> ModelSelection<M> {
    pub fn new(patience: usize) -> Self {
        Self {
            stopper:       EarlyStopping::new(patience),
            best:          None,
            epochs_run:    0,
            stopped_early: false,
        }
    }

    pub fn offer(&mut self, epoch: usize, loss: f64, model: M) -> Progress {
        let progress = self.stopper.observe(epoch, loss);
        self.epochs_run = epoch;
        match progress {
            Progress::Improved => self.best = Some(model),
            Progress::Stop     => self.stopped_early = true,
            Progress::Stalled { .. } => {}
        }
        progress
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.stopper.best_epoch()
    }

    pub fn best_loss(&self) -> f64 {
        self.stopper.best_loss()
    }

    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    /// None when no epoch ever improved (every loss was NaN).
    pub fn into_best(self) -> Option<M> {
        self.best
    }
}

pub fn is_overfitting(train_loss: f64, val_loss: f64) -> bool {
    train_loss < val_loss - OVERFIT_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `losses` until Stop; returns the number of epochs run.
    fn run(losses: &[f64], patience: usize) -> usize {
        let mut es = EarlyStopping::new(patience);
        for (i, &l) in losses.iter().enumerate() {
            if es.observe(i + 1, l) == Progress::Stop {
                return i + 1;
            }
        }
        losses.len()
    }

    #[test]
    fn test_stops_after_three_non_improving_epochs() {
        let losses = [0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
        assert_eq!(run(&losses, 3), 4);
    }

    #[test]
    fn test_equal_loss_is_not_an_improvement() {
        let losses = [0.5, 0.5, 0.5, 0.5, 0.5];
        assert_eq!(run(&losses, 3), 4);
    }

    #[test]
    fn test_improvement_resets_counter() {
        let mut es = EarlyStopping::default();
        assert_eq!(es.observe(1, 1.0), Progress::Improved);
        assert_eq!(es.observe(2, 1.1), Progress::Stalled { stale_epochs: 1 });
        assert_eq!(es.observe(3, 1.2), Progress::Stalled { stale_epochs: 2 });
        assert_eq!(es.observe(4, 0.9), Progress::Improved);
        assert_eq!(es.observe(5, 1.0), Progress::Stalled { stale_epochs: 1 });
        assert_eq!(es.best_epoch(), Some(4));
        assert_eq!(es.best_loss(), 0.9);
    }

    #[test]
    fn test_nan_loss_is_stale() {
        let mut es = EarlyStopping::default();
        assert_eq!(es.observe(1, f64::NAN), Progress::Stalled { stale_epochs: 1 });
        assert_eq!(es.best_epoch(), None);
    }

    /// Drive a selection the way the training loop does, with the
    /// epoch number standing in for the model.
    fn select(losses: &[f64], patience: usize) -> ModelSelection<usize> {
        let mut sel = ModelSelection::new(patience);
        for (i, &l) in losses.iter().enumerate() {
            if sel.offer(i + 1, l, i + 1) == Progress::Stop {
                break;
            }
        }
        sel
    }

    #[test]
    fn test_selection_keeps_first_epoch_when_loss_rises() {
        let sel = select(&[0.5, 0.6, 0.7, 0.8, 0.9], 3);
        assert_eq!(sel.best_epoch(), Some(1));
        assert_eq!(sel.epochs_run(), 4);
        assert!(sel.stopped_early());
        assert_eq!(sel.into_best(), Some(1));
    }

    #[test]
    fn test_selection_keeps_lowest_loss_not_last() {
        let sel = select(&[0.9, 0.4, 0.6, 0.5], 3);
        assert_eq!(sel.best_epoch(), Some(2));
        assert_eq!(sel.best_loss(), 0.4);
        assert_eq!(sel.epochs_run(), 4);
        assert!(!sel.stopped_early());
        assert_eq!(sel.into_best(), Some(2));
    }

    #[test]
    fn test_selection_with_only_nan_keeps_nothing() {
        let sel = select(&[f64::NAN, f64::NAN], 3);
        assert_eq!(sel.best_epoch(), None);
        assert_eq!(sel.into_best(), None);
    }

    #[test]
    fn test_overfitting_margin() {
        assert!(is_overfitting(0.2, 0.5));
        assert!(!is_overfitting(0.45, 0.5));
        assert!(!is_overfitting(0.6, 0.5));
    }
}
