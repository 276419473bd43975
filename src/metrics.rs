//! Scores of a decoded state sequence against the true one.
//!
//! Precision, recall, and F1 are computed for one target state.
//! Each of them is zero when its denominator is zero.
use crate::error::{HmmError, Result};

/// Precision, recall, and F1 of one state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateScore {
    pub state: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of the positions where the true state is `state`.
    pub support: usize,
}

impl std::fmt::Display for StateScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{:.4}\t{:.4}\t{:.4}\t{}",
            self.state, self.precision, self.recall, self.f1, self.support
        )
    }
}

// (true positive, predicted positive, actual positive)
#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    tp: usize,
    predicted: usize,
    actual: usize,
}

impl Counts {
    fn new(true_states: &[usize], predicted_states: &[usize], target: usize) -> Self {
        let mut counts = Self::default();
        for (&t, &p) in true_states.iter().zip(predicted_states.iter()) {
            counts.tp += (t == target && p == target) as usize;
            counts.predicted += (p == target) as usize;
            counts.actual += (t == target) as usize;
        }
        counts
    }
    fn precision(&self) -> f64 {
        ratio(self.tp, self.predicted)
    }
    fn recall(&self) -> f64 {
        ratio(self.tp, self.actual)
    }
    fn f1(&self) -> f64 {
        let (prec, rec) = (self.precision(), self.recall());
        if prec + rec == 0f64 {
            0f64
        } else {
            2f64 * prec * rec / (prec + rec)
        }
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    match denom {
        0 => 0f64,
        _ => num as f64 / denom as f64,
    }
}

fn check_lengths(true_states: &[usize], predicted_states: &[usize]) -> Result<()> {
    if true_states.len() != predicted_states.len() {
        Err(HmmError::LengthMismatch {
            left: true_states.len(),
            right: predicted_states.len(),
        })
    } else if true_states.is_empty() {
        Err(HmmError::EmptySequence)
    } else {
        Ok(())
    }
}

/// Percentage of the positions where the two sequences agree.
pub fn accuracy(true_states: &[usize], predicted_states: &[usize]) -> Result<f64> {
    check_lengths(true_states, predicted_states)?;
    let correct = std::iter::zip(true_states, predicted_states)
        .filter(|(t, p)| t == p)
        .count();
    Ok(correct as f64 / true_states.len() as f64 * 100f64)
}

/// TP / (predicted positives) for `target`.
pub fn precision(true_states: &[usize], predicted_states: &[usize], target: usize) -> Result<f64> {
    check_lengths(true_states, predicted_states)?;
    Ok(Counts::new(true_states, predicted_states, target).precision())
}

/// TP / (actual positives) for `target`.
pub fn recall(true_states: &[usize], predicted_states: &[usize], target: usize) -> Result<f64> {
    check_lengths(true_states, predicted_states)?;
    Ok(Counts::new(true_states, predicted_states, target).recall())
}

/// Harmonic mean of the precision and the recall for `target`.
pub fn f1_score(true_states: &[usize], predicted_states: &[usize], target: usize) -> Result<f64> {
    check_lengths(true_states, predicted_states)?;
    Ok(Counts::new(true_states, predicted_states, target).f1())
}

/// Scores of every state in `[0, num_states)`.
pub fn report(
    true_states: &[usize],
    predicted_states: &[usize],
    num_states: usize,
) -> Result<Vec<StateScore>> {
    check_lengths(true_states, predicted_states)?;
    let scores = (0..num_states)
        .map(|state| {
            let counts = Counts::new(true_states, predicted_states, state);
            StateScore {
                state,
                precision: counts.precision(),
                recall: counts.recall(),
                f1: counts.f1(),
                support: counts.actual,
            }
        })
        .collect();
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    const TRUE: [usize; 4] = [0, 1, 1, 0];
    const PRED: [usize; 4] = [0, 1, 0, 0];
    #[test]
    fn accuracy_test() {
        assert!((accuracy(&TRUE, &PRED).unwrap() - 75f64).abs() < 0.000001);
        assert!((accuracy(&TRUE, &TRUE).unwrap() - 100f64).abs() < 0.000001);
        assert_eq!(accuracy(&[1, 1], &[0, 0]).unwrap(), 0f64);
    }
    #[test]
    fn target_state_test() {
        let prec = precision(&TRUE, &PRED, 1).unwrap();
        let rec = recall(&TRUE, &PRED, 1).unwrap();
        let f1 = f1_score(&TRUE, &PRED, 1).unwrap();
        assert!((prec - 1f64).abs() < 0.000001, "{}", prec);
        assert!((rec - 0.5).abs() < 0.000001, "{}", rec);
        assert!((f1 - 2f64 / 3f64).abs() < 0.001, "{}", f1);
        let prec = precision(&TRUE, &PRED, 0).unwrap();
        assert!((prec - 2f64 / 3f64).abs() < 0.000001, "{}", prec);
        assert_eq!(recall(&TRUE, &PRED, 0).unwrap(), 1f64);
    }
    #[test]
    fn zero_denominator_test() {
        // State 2 never appears in either sequence.
        assert_eq!(precision(&TRUE, &PRED, 2).unwrap(), 0f64);
        assert_eq!(recall(&TRUE, &PRED, 2).unwrap(), 0f64);
        assert_eq!(f1_score(&TRUE, &PRED, 2).unwrap(), 0f64);
        // Predicted but never true, and true but never predicted.
        assert_eq!(f1_score(&[0, 0], &[1, 1], 1).unwrap(), 0f64);
        assert_eq!(f1_score(&[1, 1], &[0, 0], 1).unwrap(), 0f64);
    }
    #[test]
    fn invalid_input_test() {
        assert!(matches!(
            accuracy(&[0, 1], &[0]),
            Err(HmmError::LengthMismatch { left: 2, right: 1 })
        ));
        assert!(matches!(accuracy(&[], &[]), Err(HmmError::EmptySequence)));
        assert!(precision(&[0], &[0, 1], 0).is_err());
        assert!(report(&[], &[], 2).is_err());
    }
    #[test]
    fn report_test() {
        let scores = report(&TRUE, &PRED, 3).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].support, 2);
        assert_eq!(scores[1].support, 2);
        assert_eq!(scores[2].support, 0);
        assert!((scores[1].precision - 1f64).abs() < 0.000001);
        assert!((scores[1].recall - 0.5).abs() < 0.000001);
        assert_eq!(scores[2].f1, 0f64);
        for (state, score) in scores.iter().enumerate() {
            assert_eq!(score.state, state);
            let f1 = f1_score(&TRUE, &PRED, state).unwrap();
            assert!((score.f1 - f1).abs() < 0.000001);
        }
    }
}
