//! This module is to generate some random sequence from a model to assess the performance.
//! Usually, it would not be used in the real-applications.
use crate::error::Result;
use crate::hmm::HiddenMarkovModel;
use rand::distributions::{Distribution, WeightedIndex};

/// Models that can emit a sequence of hidden states and observations.
pub trait Generate {
    /// Return (states, observations), both of length `len`.
    fn generate<R: rand::Rng>(&self, len: usize, rng: &mut R) -> Result<(Vec<usize>, Vec<usize>)>;
}

impl Generate for HiddenMarkovModel {
    fn generate<R: rand::Rng>(&self, len: usize, rng: &mut R) -> Result<(Vec<usize>, Vec<usize>)> {
        let initial = WeightedIndex::<f64>::new(self.initial_probs())?;
        let transitions = self
            .transition_probs()
            .iter_rows()
            .map(WeightedIndex::<f64>::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let emissions = self
            .emission_probs()
            .iter_rows()
            .map(WeightedIndex::<f64>::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut states = Vec::with_capacity(len);
        let mut observations = Vec::with_capacity(len);
        let mut current = initial.sample(rng);
        for t in 0..len {
            if 0 < t {
                current = transitions[current].sample(rng);
            }
            states.push(current);
            observations.push(emissions[current].sample(rng));
        }
        Ok((states, observations))
    }
}

/// Random probability distribution on `len` items.
pub fn random_distribution<R: rand::Rng>(rng: &mut R, len: usize) -> Vec<f64> {
    // Every weight is at least 0.1 before normalization.
    let mut probs: Vec<f64> = (0..len).map(|_| rng.gen_range(0.1..1f64)).collect();
    crate::matrix::normalize(&mut probs);
    probs
}
