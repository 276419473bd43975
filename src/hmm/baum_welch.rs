//! Baum-Welch re-estimation.
//!
//! Each step computes the expected transition counts (xi) and the expected state occupancies (gamma)
//! from the forward and backward tables, then builds a whole new set of tables from them.
//! The model is replaced only after every table has been computed, so a failed step leaves it untouched.
use super::HiddenMarkovModel;
use crate::config::TrainConfig;
use crate::error::{HmmError, Result};
use crate::matrix::Matrix;
use log::{debug, info, trace};

/// What happened during `HiddenMarkovModel::train`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainSummary {
    /// Number of re-estimation steps carried out. Always the requested number on success.
    pub iterations: usize,
    /// Log likelihood of the training sequence under the final parameters.
    pub log_likelihood: f64,
}

impl HiddenMarkovModel {
    /// Run one Baum-Welch step on `observations` and return the re-estimated model.
    /// `self` is not modified.
    pub fn fit(&self, observations: &[usize]) -> Result<Self> {
        self.validate_observations(observations)?;
        self.fit_inner(observations)
    }
    /// Re-estimate the parameters `max_iter` times.
    /// There is no convergence check; exactly `max_iter` steps are run unless one of them fails.
    /// On failure, the model keeps the parameters of the last successful step.
    pub fn train(&mut self, observations: &[usize], max_iter: usize) -> Result<TrainSummary> {
        self.validate_observations(observations)?;
        for t in 0..max_iter {
            *self = self.fit_inner(observations)?;
            if log::log_enabled!(log::Level::Debug) {
                let (_, factors) = self.forward_scaled(observations);
                let lk: f64 = factors.iter().map(|x| x.ln()).sum();
                debug!("EM\t{}\t{:.4}", t, lk);
            }
        }
        let log_likelihood = self.log_likelihood(observations)?;
        info!(
            "Trained {} states on {} observations. {} iterations, LK:{:.4}",
            self.num_states,
            observations.len(),
            max_iter,
            log_likelihood
        );
        Ok(TrainSummary {
            iterations: max_iter,
            log_likelihood,
        })
    }
    /// Same as `train`, taking the number of iterations from `config`.
    pub fn train_with_config(
        &mut self,
        observations: &[usize],
        config: &TrainConfig,
    ) -> Result<TrainSummary> {
        self.train(observations, config.max_iter)
    }
    pub(crate) fn fit_inner(&self, observations: &[usize]) -> Result<Self> {
        let alpha = self.forward_inner(observations);
        let beta = self.backward_inner(observations);
        let (xi, gamma) = self.responsibilities(observations, &alpha, &beta)?;
        let initial_probs = gamma.row(0).to_vec();
        let transition_probs = self.estimate_transition_prob(&xi);
        let emission_probs = self.estimate_emission_prob(observations, &gamma);
        Ok(Self {
            num_states: self.num_states,
            num_observations: self.num_observations,
            transition_probs,
            emission_probs,
            initial_probs,
        })
    }
    // Return the sum of xi[t] over t = 0..T-1 (S x S) and gamma (T x S).
    // gamma[t][i] = sum_j xi[t][i][j] for t < T-1, and the last row is
    // sum_i xi[T-2][i][j], the occupancy of the state j at the last step.
    // If T = 1, there's no xi and gamma[0] is the normalized alpha[0] * beta[0].
    fn responsibilities(
        &self,
        observations: &[usize],
        alpha: &Matrix,
        beta: &Matrix,
    ) -> Result<(Matrix, Matrix)> {
        let (states, len) = (self.num_states, observations.len());
        let mut xi_sum = Matrix::zeros(states, states);
        let mut gamma = Matrix::zeros(len, states);
        let mut xi = Matrix::zeros(states, states);
        for (t, &next) in observations.iter().enumerate().skip(1).map(|(t, x)| (t - 1, x)) {
            for from in 0..states {
                for to in 0..states {
                    xi[(from, to)] = alpha[(t, from)]
                        * self.transition(from, to)
                        * self.emission(to, next)
                        * beta[(t + 1, to)];
                }
            }
            let normalizer: f64 = xi.as_slice().iter().sum();
            check_normalizer(t, normalizer)?;
            for from in 0..states {
                for to in 0..states {
                    let prob = xi[(from, to)] / normalizer;
                    xi_sum[(from, to)] += prob;
                    gamma[(t, from)] += prob;
                    if t + 2 == len {
                        gamma[(t + 1, to)] += prob;
                    }
                }
            }
        }
        if len == 1 {
            let occupancy: Vec<_> = (0..states).map(|s| alpha[(0, s)] * beta[(0, s)]).collect();
            let normalizer: f64 = occupancy.iter().sum();
            check_normalizer(0, normalizer)?;
            for (s, occ) in occupancy.iter().enumerate() {
                gamma[(0, s)] = occ / normalizer;
            }
        }
        trace!("Gamma:\n{}", gamma);
        Ok((xi_sum, gamma))
    }
    // A[i][j] = sum_t xi[t][i][j] / sum_t gamma[t][i], t = 0..T-1.
    // As sum_j xi[t][i][j] = gamma[t][i], the denominator is the row sum of xi_sum.
    // The row of a state never visited before the last step keeps the current distribution.
    fn estimate_transition_prob(&self, xi_sum: &Matrix) -> Matrix {
        let mut transition_probs = xi_sum.clone();
        for from in 0..self.num_states {
            let row = transition_probs.row_mut(from);
            let sum: f64 = row.iter().sum();
            if 0f64 < sum {
                row.iter_mut().for_each(|x| *x /= sum);
            } else {
                row.copy_from_slice(self.transition_probs.row(from));
            }
        }
        transition_probs
    }
    // B[j][v] = sum_{t:obs[t]=v} gamma[t][j] / sum_t gamma[t][j].
    // The numerator is accumulated in one pass, putting gamma[t] into the column of obs[t].
    fn estimate_emission_prob(&self, observations: &[usize], gamma: &Matrix) -> Matrix {
        let mut emission_probs = Matrix::zeros(self.num_states, self.num_observations);
        for (t, &obs) in observations.iter().enumerate() {
            for (state, &occ) in gamma.row(t).iter().enumerate() {
                emission_probs[(state, obs)] += occ;
            }
        }
        for state in 0..self.num_states {
            let row = emission_probs.row_mut(state);
            let sum: f64 = row.iter().sum();
            if 0f64 < sum {
                row.iter_mut().for_each(|x| *x /= sum);
            } else {
                row.copy_from_slice(self.emission_probs.row(state));
            }
        }
        emission_probs
    }
}

fn check_normalizer(time: usize, value: f64) -> Result<()> {
    if 0f64 < value && value.is_finite() {
        Ok(())
    } else {
        Err(HmmError::DegenerateNormalizer { time, value })
    }
}
