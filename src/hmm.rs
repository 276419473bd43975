//! A discrete hidden Markov model.
//!
//! The model holds three tables: the transition matrix (states x states),
//! the emission matrix (states x symbols) and the initial distribution.
//! The algorithms layered on them live in the submodules:
//! forward/backward recursions, Baum-Welch re-estimation, and Viterbi decoding.
//!
//! As a rule of thumb, we do not take logarithm of each table; the recursions
//! run in the probability space, so that the forward/backward tables of long
//! sequences may underflow to zero. Re-estimation reports it as
//! `HmmError::DegenerateNormalizer` instead of producing NaN.
pub mod baum_welch;
pub mod forward_backward;
pub mod viterbi;
use crate::error::{HmmError, Result, Table};
use crate::matrix::Matrix;

/// Tolerance for a row to be regarded as a probability distribution.
pub const TOLERANCE: f64 = 0.000001;

#[derive(Debug, Clone, PartialEq)]
pub struct HiddenMarkovModel {
    num_states: usize,
    num_observations: usize,
    // [from][to] = Pr{from->to}
    transition_probs: Matrix,
    // [state][symbol] = Pr{symbol|state}
    emission_probs: Matrix,
    initial_probs: Vec<f64>,
}

/// Short-hand notation.
#[allow(clippy::upper_case_acronyms)]
pub type HMM = HiddenMarkovModel;

impl std::fmt::Display for HiddenMarkovModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "States:{}", self.num_states)?;
        writeln!(f, "Symbols:{}", self.num_observations)?;
        writeln!(f, "Transition:")?;
        write!(f, "{}", self.transition_probs)?;
        writeln!(f, "Emission:")?;
        write!(f, "{}", self.emission_probs)?;
        let probs: Vec<_> = self
            .initial_probs
            .iter()
            .map(|x| format!("{:.3}", x))
            .collect();
        write!(f, "Initial:{}", probs.join("\t"))
    }
}

impl HiddenMarkovModel {
    /// Create a model with uniform distributions, 1/S for the transitions and the initial state,
    /// 1/V for the emissions.
    pub fn new(num_states: usize, num_observations: usize) -> Result<Self> {
        check_dimensions(num_states, num_observations)?;
        let state_unif = (num_states as f64).recip();
        let symbol_unif = (num_observations as f64).recip();
        Ok(Self {
            num_states,
            num_observations,
            transition_probs: Matrix::new(num_states, num_states, state_unif),
            emission_probs: Matrix::new(num_states, num_observations, symbol_unif),
            initial_probs: vec![state_unif; num_states],
        })
    }
    /// Create a model whose rows are drawn at random and then normalized.
    /// Unlike the uniform model, re-estimation starting from this model can tell the states apart.
    pub fn random<R: rand::Rng>(
        num_states: usize,
        num_observations: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_dimensions(num_states, num_observations)?;
        let mut transition_probs = Matrix::zeros(num_states, num_states);
        for from in 0..num_states {
            let row = crate::gen_seq::random_distribution(rng, num_states);
            transition_probs.row_mut(from).copy_from_slice(&row);
        }
        let mut emission_probs = Matrix::zeros(num_states, num_observations);
        for state in 0..num_states {
            let row = crate::gen_seq::random_distribution(rng, num_observations);
            emission_probs.row_mut(state).copy_from_slice(&row);
        }
        let initial_probs = crate::gen_seq::random_distribution(rng, num_states);
        Ok(Self {
            num_states,
            num_observations,
            transition_probs,
            emission_probs,
            initial_probs,
        })
    }
    /// Create a model from externally supplied tables.
    /// The tables should have the shape (S,S), (S,V), and (S,), and each row should sum up to 1.
    pub fn from_parameters(
        transition_probs: Matrix,
        emission_probs: Matrix,
        initial_probs: Vec<f64>,
    ) -> Result<Self> {
        let (num_states, num_observations) = emission_probs.shape();
        check_dimensions(num_states, num_observations)?;
        let mut model = Self::new(num_states, num_observations)?;
        model.set_transition_probs(transition_probs)?;
        model.set_emission_probs(emission_probs)?;
        model.set_initial_probs(initial_probs)?;
        Ok(model)
    }
    pub fn num_states(&self) -> usize {
        self.num_states
    }
    pub fn num_observations(&self) -> usize {
        self.num_observations
    }
    pub fn transition_probs(&self) -> &Matrix {
        &self.transition_probs
    }
    pub fn emission_probs(&self) -> &Matrix {
        &self.emission_probs
    }
    pub fn initial_probs(&self) -> &[f64] {
        &self.initial_probs
    }
    /// Pr{from->to}
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition_probs[(from, to)]
    }
    /// Pr{symbol|state}
    pub fn emission(&self, state: usize, symbol: usize) -> f64 {
        self.emission_probs[(state, symbol)]
    }
    /// Replace the transition matrix. On error, the model is not modified.
    pub fn set_transition_probs(&mut self, transition_probs: Matrix) -> Result<()> {
        let expected = (self.num_states, self.num_states);
        check_table(Table::Transition, &transition_probs, expected)?;
        self.transition_probs = transition_probs;
        Ok(())
    }
    /// Replace the emission matrix. On error, the model is not modified.
    pub fn set_emission_probs(&mut self, emission_probs: Matrix) -> Result<()> {
        let expected = (self.num_states, self.num_observations);
        check_table(Table::Emission, &emission_probs, expected)?;
        self.emission_probs = emission_probs;
        Ok(())
    }
    /// Replace the initial distribution. On error, the model is not modified.
    pub fn set_initial_probs(&mut self, initial_probs: Vec<f64>) -> Result<()> {
        if initial_probs.len() != self.num_states {
            return Err(HmmError::ShapeMismatch {
                table: Table::Initial,
                expected: (1, self.num_states),
                found: (1, initial_probs.len()),
            });
        }
        check_distribution(Table::Initial, 0, &initial_probs)?;
        self.initial_probs = initial_probs;
        Ok(())
    }
    /// Frobenius norm of the difference between the two models.
    /// Return None if the two model have different dimensions.
    pub fn dist(&self, other: &Self) -> Option<f64> {
        let trans = self.transition_probs.dist(&other.transition_probs)?;
        let emit = self.emission_probs.dist(&other.emission_probs)?;
        let init: f64 = self
            .initial_probs
            .iter()
            .zip(other.initial_probs.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum();
        Some(trans + emit + init)
    }
    /// Check that `observations` is a non-empty sequence on the alphabet of the model.
    pub fn validate_observations(&self, observations: &[usize]) -> Result<()> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        match observations
            .iter()
            .enumerate()
            .find(|&(_, &symbol)| self.num_observations <= symbol)
        {
            Some((position, &symbol)) => Err(HmmError::SymbolOutOfRange {
                position,
                symbol,
                num_observations: self.num_observations,
            }),
            None => Ok(()),
        }
    }
}

fn check_dimensions(num_states: usize, num_observations: usize) -> Result<()> {
    if num_states == 0 {
        Err(HmmError::ZeroDimension {
            what: "number of states",
        })
    } else if num_observations == 0 {
        Err(HmmError::ZeroDimension {
            what: "number of observations",
        })
    } else {
        Ok(())
    }
}

fn check_table(table: Table, probs: &Matrix, expected: (usize, usize)) -> Result<()> {
    if probs.shape() != expected {
        return Err(HmmError::ShapeMismatch {
            table,
            expected,
            found: probs.shape(),
        });
    }
    probs
        .iter_rows()
        .enumerate()
        .try_for_each(|(row, xs)| check_distribution(table, row, xs))
}

fn check_distribution(table: Table, row: usize, xs: &[f64]) -> Result<()> {
    if let Some((column, &value)) = xs
        .iter()
        .enumerate()
        .find(|(_, x)| !(x.is_finite() && 0f64 <= **x))
    {
        return Err(HmmError::NegativeProbability {
            table,
            row,
            column,
            value,
        });
    }
    let sum: f64 = xs.iter().sum();
    if TOLERANCE < (sum - 1f64).abs() {
        return Err(HmmError::InvalidDistribution { table, row, sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoroshiro128PlusPlus;
    fn assert_stochastic(model: &HMM) {
        let init: f64 = model.initial_probs().iter().sum();
        assert!((init - 1f64).abs() < 0.00001, "{}", init);
        for (i, sum) in model.transition_probs().row_sums().iter().enumerate() {
            assert!((sum - 1f64).abs() < 0.00001, "{},{}", i, sum);
        }
        for (j, sum) in model.emission_probs().row_sums().iter().enumerate() {
            assert!((sum - 1f64).abs() < 0.00001, "{},{}", j, sum);
        }
    }
    #[test]
    fn uniform_test() {
        let model = HMM::new(2, 3).unwrap();
        assert_stochastic(&model);
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_observations(), 3);
        assert_eq!(model.transition_probs().shape(), (2, 2));
        assert_eq!(model.emission_probs().shape(), (2, 3));
        assert!((model.emission(1, 2) - 1f64 / 3f64).abs() < 0.000001);
        assert!((model.transition(0, 1) - 0.5).abs() < 0.000001);
    }
    #[test]
    fn zero_dimension_test() {
        assert!(matches!(HMM::new(0, 3), Err(HmmError::ZeroDimension { .. })));
        assert!(matches!(HMM::new(3, 0), Err(HmmError::ZeroDimension { .. })));
    }
    #[test]
    fn random_test() {
        for i in 0..5u64 {
            let mut rng: Xoroshiro128PlusPlus = SeedableRng::seed_from_u64(i);
            let model = HMM::random(4, 7, &mut rng).unwrap();
            assert_stochastic(&model);
        }
        let mut rng: Xoroshiro128PlusPlus = SeedableRng::seed_from_u64(10);
        let model = HMM::random(3, 3, &mut rng).unwrap();
        let mut rng: Xoroshiro128PlusPlus = SeedableRng::seed_from_u64(10);
        assert_eq!(model, HMM::random(3, 3, &mut rng).unwrap());
    }
    #[test]
    fn replace_test() {
        let mut model = HMM::new(2, 2).unwrap();
        let trans = Matrix::from_rows(&[[0.9, 0.1], [0.2, 0.8]], Table::Transition).unwrap();
        model.set_transition_probs(trans.clone()).unwrap();
        assert_eq!(model.transition_probs(), &trans);
        let wrong_shape = Matrix::new(3, 2, 0.5);
        let result = model.set_transition_probs(wrong_shape);
        assert!(matches!(result, Err(HmmError::ShapeMismatch { .. })));
        let not_normalized = Matrix::from_rows(&[[0.9, 0.2], [0.2, 0.8]], Table::Transition);
        let result = model.set_transition_probs(not_normalized.unwrap());
        assert!(matches!(
            result,
            Err(HmmError::InvalidDistribution { row: 0, .. })
        ));
        let negative = Matrix::from_rows(&[[1.2, -0.2], [0.2, 0.8]], Table::Emission);
        let result = model.set_emission_probs(negative.unwrap());
        assert!(matches!(
            result,
            Err(HmmError::NegativeProbability {
                row: 0,
                column: 1,
                ..
            })
        ));
        assert!(model.set_initial_probs(vec![0.5, 0.6]).is_err());
        assert!(model.set_initial_probs(vec![1f64]).is_err());
        model.set_initial_probs(vec![1f64, 0f64]).unwrap();
        // Rejected tables leave the model as it was.
        assert_eq!(model.transition_probs(), &trans);
        assert_eq!(model.emission_probs(), &Matrix::new(2, 2, 0.5));
        assert_eq!(model.initial_probs(), &[1f64, 0f64]);
    }
    #[test]
    fn from_parameters_test() {
        let trans = Matrix::from_rows(&[[0.7, 0.3], [0.4, 0.6]], Table::Transition).unwrap();
        let emit = Matrix::from_rows(&[[0.1, 0.4, 0.5], [0.6, 0.3, 0.1]], Table::Emission);
        let model = HMM::from_parameters(trans, emit.unwrap(), vec![0.6, 0.4]).unwrap();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_observations(), 3);
        assert_stochastic(&model);
        assert_eq!(model.dist(&model), Some(0f64));
        let other = HMM::new(2, 4).unwrap();
        assert_eq!(model.dist(&other), None);
    }
    #[test]
    fn validate_test() {
        let model = HMM::new(2, 3).unwrap();
        assert!(model.validate_observations(&[0, 1, 2]).is_ok());
        assert!(matches!(
            model.validate_observations(&[]),
            Err(HmmError::EmptySequence)
        ));
        assert!(matches!(
            model.validate_observations(&[0, 3, 1]),
            Err(HmmError::SymbolOutOfRange {
                position: 1,
                symbol: 3,
                num_observations: 3
            })
        ));
    }
}
