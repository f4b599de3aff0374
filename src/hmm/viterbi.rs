//! Log-space Viterbi decoding.
//!
//! The dynamic program fills an S×L table of best partial-path
//! log-probabilities together with an S×L backpointer table, then walks the
//! backpointers from the best final state to reconstruct the full path.
//! Ties resolve to the lowest state index at every step, which makes the
//! output fully deterministic.

use ndarray::Array2;

use crate::error::{HmmError, Result};
use crate::hmm::model::HiddenMarkovModel;

/// Backpointer sentinel for position 0, which has no predecessor.
const NO_PREDECESSOR: usize = usize::MAX;

impl HiddenMarkovModel {
    /// Decode the most probable hidden-state sequence for `observations`.
    ///
    /// Runs in O(S²·L) time and O(S·L) space, where S is the number of
    /// states and L the observation length. Fresh DP tables are allocated
    /// per call; the model itself is never mutated, so concurrent calls on
    /// a shared model are safe.
    ///
    /// # Errors
    ///
    /// - `HmmError::EmptySequence` if `observations` is empty
    /// - `HmmError::UnknownSymbol` if any observation is outside the
    ///   alphabet; the symbols are mapped up front, so no DP work happens
    ///   on a corrupt sequence
    pub fn decode(&self, observations: &[char]) -> Result<Vec<char>> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }

        let indices = observations
            .iter()
            .map(|&symbol| self.symbol_index(symbol))
            .collect::<Result<Vec<usize>>>()?;

        let path = self.decode_indices(&indices);
        Ok(path.into_iter().map(|s| self.state_label(s)).collect())
    }

    /// The Viterbi DP over pre-mapped observation indices.
    fn decode_indices(&self, observations: &[usize]) -> Vec<usize> {
        let num_states = self.num_states();
        let length = observations.len();

        let mut dp = Array2::from_elem((num_states, length), f64::NEG_INFINITY);
        let mut backpointer = Array2::from_elem((num_states, length), NO_PREDECESSOR);

        // Initialization: best path of length 1 ending in each state.
        for state in 0..num_states {
            dp[[state, 0]] =
                self.log_initial()[state] + self.log_emission()[[state, observations[0]]];
        }

        // Forward recurrence. Strict `>` with a scan from state 0 upward
        // means the first state achieving the maximum wins, including when
        // every candidate is negative infinity.
        for i in 1..length {
            let symbol = observations[i];
            for state in 0..num_states {
                let mut best = f64::NEG_INFINITY;
                let mut best_prev = 0;
                for prev in 0..num_states {
                    let candidate = dp[[prev, i - 1]] + self.log_transition()[[prev, state]];
                    if candidate > best {
                        best = candidate;
                        best_prev = prev;
                    }
                }
                dp[[state, i]] = best + self.log_emission()[[state, symbol]];
                backpointer[[state, i]] = best_prev;
            }
        }

        // Termination: best final state, same first-match tie-break.
        let mut best_final = f64::NEG_INFINITY;
        let mut last_state = 0;
        for state in 0..num_states {
            if dp[[state, length - 1]] > best_final {
                best_final = dp[[state, length - 1]];
                last_state = state;
            }
        }

        // Backtrace.
        let mut path = vec![0; length];
        path[length - 1] = last_state;
        for i in (1..length).rev() {
            path[i - 1] = backpointer[[path[i], i]];
        }

        path
    }
}
