use super::HiddenMarkovModel;
use crate::error::Result;
use crate::matrix::Matrix;

impl HiddenMarkovModel {
    /// Forward algorithm. Return the (T x S) table, where the [t][j] element is
    /// Pr{obs[..=t], state at t = j}.
    /// The table is not scaled, so the values of a long sequence would underflow to zero.
    /// To get the likelihood of such sequences, use `Self::log_likelihood` instead.
    pub fn forward(&self, observations: &[usize]) -> Result<Matrix> {
        self.validate_observations(observations)?;
        Ok(self.forward_inner(observations))
    }
    /// Backward algorithm. Return the (T x S) table, where the [t][i] element is
    /// Pr{obs[t+1..] | state at t = i}. The same caveat as `Self::forward` applies.
    pub fn backward(&self, observations: &[usize]) -> Result<Matrix> {
        self.validate_observations(observations)?;
        Ok(self.backward_inner(observations))
    }
    /// Return the probability to see `observations`, summing over all the state paths.
    pub fn likelihood(&self, observations: &[usize]) -> Result<f64> {
        let alpha = self.forward(observations)?;
        Ok(alpha.row(alpha.rows() - 1).iter().sum())
    }
    /// Return the log likelihood of `observations`. Each row of the forward table
    /// is normalized, thus it can be used for long sequences.
    /// If the sequence is impossible under the model, it returns negative infinity.
    pub fn log_likelihood(&self, observations: &[usize]) -> Result<f64> {
        self.validate_observations(observations)?;
        let (_, factors) = self.forward_scaled(observations);
        Ok(factors.iter().map(|x| x.ln()).sum())
    }
    pub(crate) fn forward_inner(&self, observations: &[usize]) -> Matrix {
        let states = self.num_states;
        let mut alpha = Matrix::zeros(observations.len(), states);
        for (s, &init) in self.initial_probs.iter().enumerate() {
            alpha[(0, s)] = init * self.emission(s, observations[0]);
        }
        for (t, &obs) in observations.iter().enumerate().skip(1) {
            for s in 0..states {
                let trans: f64 = (0..states)
                    .map(|from| alpha[(t - 1, from)] * self.transition(from, s))
                    .sum();
                alpha[(t, s)] = trans * self.emission(s, obs);
            }
        }
        alpha
    }
    pub(crate) fn backward_inner(&self, observations: &[usize]) -> Matrix {
        let (states, len) = (self.num_states, observations.len());
        let mut beta = Matrix::zeros(len, states);
        beta.row_mut(len - 1).iter_mut().for_each(|x| *x = 1f64);
        for t in (0..len - 1).rev() {
            let next = observations[t + 1];
            for s in 0..states {
                beta[(t, s)] = (0..states)
                    .map(|to| beta[(t + 1, to)] * self.transition(s, to) * self.emission(to, next))
                    .sum();
            }
        }
        beta
    }
    // Forward algorithm with each row normalized to 1.
    // The unscaled value of alpha[t][s] is the scaled value times the product of factors[..=t].
    // Once a row sums to zero, the rest of the table is left zero.
    pub(crate) fn forward_scaled(&self, observations: &[usize]) -> (Matrix, Vec<f64>) {
        let states = self.num_states;
        let mut alpha = Matrix::zeros(observations.len(), states);
        let mut factors = Vec::with_capacity(observations.len());
        for (s, &init) in self.initial_probs.iter().enumerate() {
            alpha[(0, s)] = init * self.emission(s, observations[0]);
        }
        for (t, &obs) in observations.iter().enumerate() {
            if 0 < t {
                for s in 0..states {
                    let trans: f64 = (0..states)
                        .map(|from| alpha[(t - 1, from)] * self.transition(from, s))
                        .sum();
                    alpha[(t, s)] = trans * self.emission(s, obs);
                }
            }
            let total: f64 = alpha.row(t).iter().sum();
            factors.push(total);
            if 0f64 < total {
                alpha.row_mut(t).iter_mut().for_each(|x| *x /= total);
            }
        }
        (alpha, factors)
    }
}
