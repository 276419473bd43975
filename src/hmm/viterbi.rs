use super::HiddenMarkovModel;
use crate::error::Result;
use crate::matrix::{argmax, max_with_arg, Matrix};

impl HiddenMarkovModel {
    /// Return the most likely state sequence for `observations`.
    /// When several paths share the maximum, the one with smaller state indices
    /// at each backtracking step is taken.
    pub fn decode(&self, observations: &[usize]) -> Result<Vec<usize>> {
        self.viterbi(observations).map(|(_, states)| states)
    }
    /// Viterbi algorithm. Return the probability of the best path and the path itself.
    /// The probability is not scaled and would be zero for a long sequence;
    /// even so, the returned path has the same length as `observations`.
    pub fn viterbi(&self, observations: &[usize]) -> Result<(f64, Vec<usize>)> {
        self.validate_observations(observations)?;
        let (states, len) = (self.num_states, observations.len());
        let mut delta = Matrix::zeros(len, states);
        let mut psi = vec![vec![0usize; states]; len];
        for (s, &init) in self.initial_probs.iter().enumerate() {
            delta[(0, s)] = init * self.emission(s, observations[0]);
        }
        let mut candidates = vec![0f64; states];
        for (t, &obs) in observations.iter().enumerate().skip(1) {
            for to in 0..states {
                for (from, cand) in candidates.iter_mut().enumerate() {
                    *cand = delta[(t - 1, from)] * self.transition(from, to);
                }
                let (arg, max) = max_with_arg(&candidates);
                psi[t][to] = arg;
                delta[(t, to)] = max * self.emission(to, obs);
            }
        }
        let last = argmax(delta.row(len - 1));
        let max_lk = delta[(len - 1, last)];
        // Trace back.
        let mut path = vec![last];
        let mut state = last;
        for t in (1..len).rev() {
            state = psi[t][state];
            path.push(state);
        }
        path.reverse();
        Ok((max_lk, path))
    }
}
