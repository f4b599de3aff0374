use ndarray::{Array1, Array2};

use crate::error::{HmmError, Result};

/// Tolerance used when checking that probability rows sum to 1.
const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// A discrete Hidden Markov Model over a fixed observation alphabet.
///
/// The model owns:
/// - an ordered set of single-character state labels,
/// - an ordered observation alphabet,
/// - the initial-state distribution,
/// - the state-transition matrix (row `i` = transitions out of state `i`),
/// - the emission matrix (row `i` = symbol probabilities in state `i`).
///
/// All probabilities are converted to natural-log space exactly once at
/// construction and never mutated afterwards, so a model can be shared
/// read-only between threads decoding independent sequences. A probability
/// of zero maps to `f64::NEG_INFINITY`, which is a valid "impossible"
/// score in every comparison the decoder performs.
#[derive(Debug, Clone)]
pub struct HiddenMarkovModel {
    states: Vec<char>,
    alphabet: Vec<char>,
    log_initial: Array1<f64>,
    log_transition: Array2<f64>,
    log_emission: Array2<f64>,
}

impl HiddenMarkovModel {
    /// Create a model from plain-probability parameters.
    ///
    /// # Arguments
    ///
    /// - `states`: distinct state labels, length S
    /// - `alphabet`: distinct observation symbols, length A
    /// - `initial`: length-S initial distribution
    /// - `transition`: S×S matrix, row `i` = P(next state | state i)
    /// - `emission`: S×A matrix, row `i` = P(symbol | state i)
    ///
    /// # Errors
    ///
    /// Returns `HmmError::InvalidModel` if labels or symbols repeat, any
    /// dimension is inconsistent, or any probability row does not sum to 1
    /// within `1e-6`. Zero probabilities are not an error; they become
    /// negative infinity in log-space.
    pub fn new(
        states: Vec<char>,
        alphabet: Vec<char>,
        initial: Array1<f64>,
        transition: Array2<f64>,
        emission: Array2<f64>,
    ) -> Result<Self> {
        let num_states = states.len();
        let num_symbols = alphabet.len();

        if num_states == 0 {
            return Err(HmmError::invalid_model("state set is empty"));
        }
        if num_symbols == 0 {
            return Err(HmmError::invalid_model("observation alphabet is empty"));
        }
        check_distinct(&states, "state label")?;
        check_distinct(&alphabet, "alphabet symbol")?;

        if initial.len() != num_states {
            return Err(HmmError::invalid_model(format!(
                "initial distribution has length {}, expected {}",
                initial.len(),
                num_states
            )));
        }
        if transition.dim() != (num_states, num_states) {
            return Err(HmmError::invalid_model(format!(
                "transition matrix is {:?}, expected ({num_states}, {num_states})",
                transition.dim()
            )));
        }
        if emission.dim() != (num_states, num_symbols) {
            return Err(HmmError::invalid_model(format!(
                "emission matrix is {:?}, expected ({num_states}, {num_symbols})",
                emission.dim()
            )));
        }

        check_row_sum(initial.iter(), "initial distribution")?;
        for (i, row) in transition.rows().into_iter().enumerate() {
            check_row_sum(row.iter(), &format!("transition row {i}"))?;
        }
        for (i, row) in emission.rows().into_iter().enumerate() {
            check_row_sum(row.iter(), &format!("emission row {i}"))?;
        }

        // One-time log-space conversion; ln(0) = -inf is intentional.
        Ok(Self {
            states,
            alphabet,
            log_initial: initial.mapv(f64::ln),
            log_transition: transition.mapv(f64::ln),
            log_emission: emission.mapv(f64::ln),
        })
    }

    /// Number of hidden states S.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Size A of the observation alphabet.
    pub fn num_symbols(&self) -> usize {
        self.alphabet.len()
    }

    /// Label of the state with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not in `[0, S)`.
    pub fn state_label(&self, state: usize) -> char {
        self.states[state]
    }

    /// Map an observed symbol to its alphabet index.
    ///
    /// The alphabet is small (single characters), so a linear scan is both
    /// sufficient and deterministic.
    ///
    /// # Errors
    ///
    /// Returns `HmmError::UnknownSymbol` when the symbol is outside the
    /// configured alphabet.
    pub fn symbol_index(&self, symbol: char) -> Result<usize> {
        self.alphabet
            .iter()
            .position(|&s| s == symbol)
            .ok_or(HmmError::UnknownSymbol(symbol))
    }

    /// Initial-state log-probabilities, length S.
    pub fn log_initial(&self) -> &Array1<f64> {
        &self.log_initial
    }

    /// Transition log-probabilities, S×S.
    pub fn log_transition(&self) -> &Array2<f64> {
        &self.log_transition
    }

    /// Emission log-probabilities, S×A.
    pub fn log_emission(&self) -> &Array2<f64> {
        &self.log_emission
    }
}

pub(crate) fn check_distinct(items: &[char], what: &str) -> Result<()> {
    for (i, a) in items.iter().enumerate() {
        if items[..i].contains(a) {
            return Err(HmmError::invalid_model(format!("duplicate {what} '{a}'")));
        }
    }
    Ok(())
}

fn check_row_sum<'a>(row: impl Iterator<Item = &'a f64>, what: &str) -> Result<()> {
    let sum: f64 = row.sum();
    if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
        return Err(HmmError::invalid_model(format!(
            "{what} sums to {sum}, expected 1"
        )));
    }
    Ok(())
}
