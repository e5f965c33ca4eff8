//! Binary classification metrics for the positive class `1`.
//!
//! Undefined ratios (no predicted or no actual positives) evaluate to zero.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Confusion {
    tp: usize,
    fp: usize,
    fn_: usize,
    tn: usize,
}

impl Confusion {
    fn count(y_true: &[u8], y_pred: &[u8]) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let mut confusion = Confusion::default();
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth == 1, pred == 1) {
                (true, true) => confusion.tp += 1,
                (false, true) => confusion.fp += 1,
                (true, false) => confusion.fn_ += 1,
                (false, false) => confusion.tn += 1,
            }
        }
        confusion
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn precision(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = Confusion::count(y_true, y_pred);
    ratio(c.tp, c.tp + c.fp)
}

pub fn recall(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = Confusion::count(y_true, y_pred);
    ratio(c.tp, c.tp + c.fn_)
}

/// Harmonic mean of precision and recall.
pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = Confusion::count(y_true, y_pred);
    ratio(2 * c.tp, 2 * c.tp + c.fp + c.fn_)
}

pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = Confusion::count(y_true, y_pred);
    ratio(c.tp + c.tn, c.tp + c.tn + c.fp + c.fn_)
}
