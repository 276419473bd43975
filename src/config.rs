//! Training configuration and the choice of the initial model.
use crate::error::Result;
use crate::hmm::HiddenMarkovModel;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

pub const DEFAULT_MAX_ITER: usize = 100;

#[derive(Debug, Clone)]
/// Configurations for training.
pub struct TrainConfig {
    /// Number of Baum-Welch iterations.
    pub max_iter: usize,
    /// If set, the initial parameters are drawn at random with this seed. Otherwise uniform.
    pub seed: Option<u64>,
}

impl TrainConfig {
    pub fn new(max_iter: usize, seed: Option<u64>) -> Self {
        Self { max_iter, seed }
    }
    /// Model to start the re-estimation from.
    pub fn initial_model(
        &self,
        num_states: usize,
        num_observations: usize,
    ) -> Result<HiddenMarkovModel> {
        match self.seed {
            Some(seed) => {
                let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
                HiddenMarkovModel::random(num_states, num_observations, &mut rng)
            }
            None => HiddenMarkovModel::new(num_states, num_observations),
        }
    }
}

impl std::default::Default for TrainConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITER, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn default_test() {
        let config = TrainConfig::default();
        assert_eq!(config.max_iter, 100);
        let model = config.initial_model(2, 3).unwrap();
        assert_eq!(model, HiddenMarkovModel::new(2, 3).unwrap());
    }
    #[test]
    fn seeded_test() {
        let config = TrainConfig::new(10, Some(4));
        let model = config.initial_model(3, 5).unwrap();
        assert_eq!(model, config.initial_model(3, 5).unwrap());
        assert_ne!(model, HiddenMarkovModel::new(3, 5).unwrap());
    }
}
