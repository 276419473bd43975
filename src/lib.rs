//! Discrete hidden Markov models: likelihood evaluation, Baum-Welch training, and Viterbi decoding.
//!
//! ```no_run
//! use hmmtag::HiddenMarkovModel;
//! let observations = vec![0, 1, 2, 1, 0];
//! let mut model = HiddenMarkovModel::new(2, 3).unwrap();
//! model.train(&observations, 10).unwrap();
//! let states = model.decode(&observations).unwrap();
//! assert_eq!(states.len(), observations.len());
//! ```
pub mod config;
pub mod corpus;
pub mod error;
pub mod gen_seq;
pub mod hmm;
pub mod matrix;
pub mod metrics;
pub mod persist;

pub use config::TrainConfig;
pub use error::{HmmError, Result};
pub use hmm::baum_welch::TrainSummary;
pub use hmm::{HiddenMarkovModel, HMM};
pub use matrix::Matrix;
