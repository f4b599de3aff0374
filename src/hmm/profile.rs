//! Profile HMM construction and decoding.
//!
//! A profile HMM is derived by counting from an aligned FASTA training set:
//! alignment columns with a gap fraction below 0.5 become match columns,
//! and each match position k carries a match state `Mk`, an insert state
//! `Ik` and a silent delete state `Dk`. Emission and transition counts get
//! +1 pseudocounts before normalization; everything is converted to
//! log-space once, exactly like the generic decoder. Transitions that the
//! topology forbids (e.g. a delete past the last match position) stay at
//! probability zero, i.e. negative infinity in log-space.
//!
//! Decoding runs a three-plane Viterbi (one DP plane per state kind) in
//! global mode and reports one `M`/`I` label per residue; delete states
//! participate in the DP but consume no residue, so they never appear in
//! the reported path.

use log::debug;
use ndarray::{Array2, Array3};

use crate::error::{HmmError, Result};
use crate::hmm::model::check_distinct;
use crate::io::fasta::Sequence;

/// The RNA alphabet used by the profile-decoding CLI.
pub const RNA_ALPHABET: [char; 4] = ['A', 'C', 'G', 'U'];

/// Gap character in aligned training sequences.
pub const GAP: char = '-';

/// Gap fraction at or above which an alignment column is treated as an
/// insert column rather than a match column.
const MATCH_GAP_THRESHOLD: f64 = 0.5;

// State-kind codes shared by the transition tensor and the backpointers.
const MATCH: usize = 0;
const INSERT: usize = 1;
const DELETE: usize = 2;
const NUM_KINDS: usize = 3;

/// Backpointer sentinel for the begin state.
const NO_PREDECESSOR: u8 = u8::MAX;

/// A match/insert/delete profile HMM built from an aligned training set.
///
/// Position indices run from 0 (the virtual begin state, treated as match
/// position 0) to `profile_len`; the end state is treated as match position
/// `profile_len + 1`. Immutable after construction.
#[derive(Debug, Clone)]
pub struct ProfileHmm {
    alphabet: Vec<char>,
    profile_len: usize,
    /// Match emission log-probs, `profile_len` × A; row k-1 = state Mk.
    log_match_emission: Array2<f64>,
    /// Insert emission log-probs, `profile_len + 1` × A; row k = state Ik.
    log_insert_emission: Array2<f64>,
    /// Transition log-probs, (`profile_len + 1`) × 3 × 3, indexed by
    /// (position, from-kind, to-kind). "To match" at the last position
    /// means the transition into the end state.
    log_transition: Array3<f64>,
}

impl ProfileHmm {
    /// Derive a profile HMM from aligned training sequences by counting.
    ///
    /// # Errors
    ///
    /// - `HmmError::InvalidModel` if the training set is empty, the rows
    ///   have differing aligned lengths, the alphabet is empty or holds
    ///   duplicates, or no column qualifies as a match column
    /// - `HmmError::UnknownSymbol` if a non-gap residue is outside
    ///   `alphabet` (case-insensitive)
    pub fn from_training(training: &[Sequence], alphabet: &[char]) -> Result<Self> {
        if training.is_empty() {
            return Err(HmmError::invalid_model("training set is empty"));
        }
        if alphabet.is_empty() {
            return Err(HmmError::invalid_model("observation alphabet is empty"));
        }
        let alphabet: Vec<char> = alphabet.iter().map(|c| c.to_ascii_uppercase()).collect();
        check_distinct(&alphabet, "alphabet symbol")?;

        let num_columns = training[0].residues.len();
        for sequence in training {
            if sequence.residues.len() != num_columns {
                return Err(HmmError::invalid_model(format!(
                    "aligned sequence '{}' has length {}, expected {}",
                    sequence.name,
                    sequence.residues.len(),
                    num_columns
                )));
            }
        }
        if num_columns == 0 {
            return Err(HmmError::invalid_model("training alignment has no columns"));
        }

        // Classify columns by gap fraction.
        let num_sequences = training.len();
        let is_match_column: Vec<bool> = (0..num_columns)
            .map(|column| {
                let gaps = training
                    .iter()
                    .filter(|s| s.residues[column] == GAP)
                    .count();
                (gaps as f64 / num_sequences as f64) < MATCH_GAP_THRESHOLD
            })
            .collect();
        let profile_len = is_match_column.iter().filter(|&&m| m).count();
        if profile_len == 0 {
            return Err(HmmError::invalid_model(
                "no match columns in training alignment (all columns are gap-dominated)",
            ));
        }

        let num_symbols = alphabet.len();
        let symbol_index = |symbol: char| -> Result<usize> {
            let upper = symbol.to_ascii_uppercase();
            alphabet
                .iter()
                .position(|&s| s == upper)
                .ok_or(HmmError::UnknownSymbol(symbol))
        };

        // Count emissions and transitions with +1 pseudocounts. Counting
        // starts from the pseudocount so normalization needs no second pass
        // over the topology.
        let mut match_counts = Array2::from_elem((profile_len, num_symbols), 1.0);
        let mut insert_counts = Array2::from_elem((profile_len + 1, num_symbols), 1.0);
        let mut transition_counts = Array3::zeros((profile_len + 1, NUM_KINDS, NUM_KINDS));
        for position in 0..=profile_len {
            for from in [MATCH, INSERT, DELETE] {
                if from == DELETE && position == 0 {
                    continue; // no delete state before the first match column
                }
                for to in [MATCH, INSERT, DELETE] {
                    if to == DELETE && position == profile_len {
                        continue; // no delete state past the last match column
                    }
                    transition_counts[[position, from, to]] = 1.0;
                }
            }
        }

        // Walk every training row through the column classification,
        // counting the implied state path begin -> ... -> end.
        for sequence in training {
            let mut position = 0;
            let mut kind = MATCH; // begin behaves like match position 0
            for (column, &residue) in sequence.residues.iter().enumerate() {
                let is_gap = residue == GAP;
                if is_match_column[column] {
                    let next = if is_gap { DELETE } else { MATCH };
                    transition_counts[[position, kind, next]] += 1.0;
                    position += 1;
                    kind = next;
                    if !is_gap {
                        match_counts[[position - 1, symbol_index(residue)?]] += 1.0;
                    }
                } else if !is_gap {
                    transition_counts[[position, kind, INSERT]] += 1.0;
                    kind = INSERT;
                    insert_counts[[position, symbol_index(residue)?]] += 1.0;
                }
            }
            // Exit into the end state.
            transition_counts[[profile_len, kind, MATCH]] += 1.0;
        }

        // Normalize and convert to log-space. Rows that stayed all-zero
        // belong to forbidden source states and become all -inf.
        let log_match_emission = normalize_rows_log(match_counts);
        let log_insert_emission = normalize_rows_log(insert_counts);
        let mut log_transition = transition_counts;
        for position in 0..=profile_len {
            for from in [MATCH, INSERT, DELETE] {
                let total: f64 = (0..NUM_KINDS)
                    .map(|to| log_transition[[position, from, to]])
                    .sum();
                for to in [MATCH, INSERT, DELETE] {
                    let count = log_transition[[position, from, to]];
                    log_transition[[position, from, to]] = if total > 0.0 {
                        (count / total).ln()
                    } else {
                        f64::NEG_INFINITY
                    };
                }
            }
        }

        debug!(
            "built profile of length {profile_len} from {num_sequences} aligned sequences \
             ({num_columns} columns)"
        );

        Ok(Self {
            alphabet,
            profile_len,
            log_match_emission,
            log_insert_emission,
            log_transition,
        })
    }

    /// Number of match positions in the profile.
    pub fn profile_len(&self) -> usize {
        self.profile_len
    }

    /// The observation alphabet (uppercased).
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Map a residue to its alphabet index, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `HmmError::UnknownSymbol` for residues outside the alphabet.
    pub fn symbol_index(&self, symbol: char) -> Result<usize> {
        let upper = symbol.to_ascii_uppercase();
        self.alphabet
            .iter()
            .position(|&s| s == upper)
            .ok_or(HmmError::UnknownSymbol(symbol))
    }

    /// Decode a sequence against the profile, returning one state label
    /// (`M` or `I`) per residue.
    ///
    /// Three DP planes track the best log-probability of reaching each
    /// (residues consumed, profile position) cell in a match, insert, or
    /// delete state. Delete states advance the profile position without
    /// consuming a residue, so they are filled within a row after their
    /// same-row predecessors. Ties resolve in match, insert, delete order,
    /// mirroring the generic decoder's lowest-index rule.
    ///
    /// # Errors
    ///
    /// - `HmmError::EmptySequence` for an empty input
    /// - `HmmError::UnknownSymbol` for residues outside the alphabet,
    ///   detected before any DP work
    pub fn decode(&self, observations: &[char]) -> Result<Vec<char>> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        let encoded = observations
            .iter()
            .map(|&symbol| self.symbol_index(symbol))
            .collect::<Result<Vec<usize>>>()?;

        let length = encoded.len();
        let width = self.profile_len + 1;
        let t = &self.log_transition;

        let mut score = [
            Array2::from_elem((length + 1, width), f64::NEG_INFINITY),
            Array2::from_elem((length + 1, width), f64::NEG_INFINITY),
            Array2::from_elem((length + 1, width), f64::NEG_INFINITY),
        ];
        let mut backpointer = [
            Array2::from_elem((length + 1, width), NO_PREDECESSOR),
            Array2::from_elem((length + 1, width), NO_PREDECESSOR),
            Array2::from_elem((length + 1, width), NO_PREDECESSOR),
        ];

        // Begin state: match position 0, nothing consumed.
        score[MATCH][[0, 0]] = 0.0;

        for consumed in 0..=length {
            for position in 0..width {
                // Match: consumes a residue, advances the position.
                if consumed >= 1 && position >= 1 {
                    let emit = self.log_match_emission[[position - 1, encoded[consumed - 1]]];
                    let (best, from) = best_predecessor(&score, consumed - 1, position - 1, |k| {
                        t[[position - 1, k, MATCH]]
                    });
                    score[MATCH][[consumed, position]] = emit + best;
                    backpointer[MATCH][[consumed, position]] = from;
                }

                // Insert: consumes a residue, position unchanged.
                if consumed >= 1 {
                    let emit = self.log_insert_emission[[position, encoded[consumed - 1]]];
                    let (best, from) = best_predecessor(&score, consumed - 1, position, |k| {
                        t[[position, k, INSERT]]
                    });
                    score[INSERT][[consumed, position]] = emit + best;
                    backpointer[INSERT][[consumed, position]] = from;
                }

                // Delete: silent, advances the position within the row.
                if position >= 1 {
                    let (best, from) = best_predecessor(&score, consumed, position - 1, |k| {
                        t[[position - 1, k, DELETE]]
                    });
                    score[DELETE][[consumed, position]] = best;
                    backpointer[DELETE][[consumed, position]] = from;
                }
            }
        }

        // Termination: transition out of the last position into the end
        // state, same first-kind tie-break as everywhere else.
        let (_, mut kind_code) = best_predecessor(&score, length, self.profile_len, |k| {
            t[[self.profile_len, k, MATCH]]
        });

        // Backtrace from (length, profile_len) to the begin state.
        let mut labels = Vec::with_capacity(length);
        let mut consumed = length;
        let mut position = self.profile_len;
        loop {
            let kind = kind_code as usize;
            if kind == MATCH && position == 0 {
                break;
            }
            let from = backpointer[kind][[consumed, position]];
            match kind {
                MATCH => {
                    labels.push('M');
                    consumed -= 1;
                    position -= 1;
                }
                INSERT => {
                    labels.push('I');
                    consumed -= 1;
                }
                _ => {
                    position -= 1;
                }
            }
            kind_code = from;
        }
        labels.reverse();

        Ok(labels)
    }
}

/// Best predecessor among the three planes at a fixed cell, scanning in
/// match, insert, delete order with strict `>` so the first kind achieving
/// the maximum wins.
fn best_predecessor(
    score: &[Array2<f64>; NUM_KINDS],
    consumed: usize,
    position: usize,
    transition: impl Fn(usize) -> f64,
) -> (f64, u8) {
    let mut best = f64::NEG_INFINITY;
    let mut from = MATCH as u8;
    for kind in [MATCH, INSERT, DELETE] {
        let candidate = score[kind][[consumed, position]] + transition(kind);
        if candidate > best {
            best = candidate;
            from = kind as u8;
        }
    }
    (best, from)
}

/// Normalize each row of a count matrix and take element-wise logs.
fn normalize_rows_log(mut counts: Array2<f64>) -> Array2<f64> {
    for mut row in counts.rows_mut() {
        let total: f64 = row.iter().sum();
        for cell in row.iter_mut() {
            *cell = (*cell / total).ln();
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(name: &str, residues: &str) -> Sequence {
        Sequence {
            name: name.to_string(),
            residues: residues.chars().collect(),
        }
    }

    fn tiny_profile() -> ProfileHmm {
        let training = vec![
            sequence("t1", "ACG"),
            sequence("t2", "A-G"),
            sequence("t3", "ACG"),
        ];
        ProfileHmm::from_training(&training, &RNA_ALPHABET).unwrap()
    }

    #[test]
    fn counts_match_columns() {
        let model = tiny_profile();
        // One gap out of three in the middle column keeps it a match column.
        assert_eq!(model.profile_len(), 3);
    }

    #[test]
    fn gap_dominated_columns_become_inserts() {
        let training = vec![
            sequence("t1", "AC-G"),
            sequence("t2", "A--G"),
            sequence("t3", "A-CG"),
        ];
        let model = ProfileHmm::from_training(&training, &RNA_ALPHABET).unwrap();
        // Columns 2 and 3 are gap-dominated (2/3 gaps each).
        assert_eq!(model.profile_len(), 2);
    }

    #[test]
    fn consensus_sequence_decodes_to_all_matches() {
        let model = tiny_profile();
        let path = model.decode(&['A', 'C', 'G']).unwrap();
        assert_eq!(path, vec!['M', 'M', 'M']);
    }

    #[test]
    fn shorter_sequence_routes_through_a_delete() {
        let model = tiny_profile();
        // 'A' and 'G' hit match columns 1 and 3; the skipped middle column
        // is a silent delete, so it contributes no label.
        let path = model.decode(&['A', 'G']).unwrap();
        assert_eq!(path, vec!['M', 'M']);
    }

    #[test]
    fn longer_sequence_routes_through_an_insert() {
        let model = tiny_profile();
        let path = model.decode(&['A', 'C', 'C', 'G']).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.iter().filter(|&&s| s == 'M').count(), 3);
        assert_eq!(path.iter().filter(|&&s| s == 'I').count(), 1);
    }

    #[test]
    fn decoding_is_case_insensitive() {
        let model = tiny_profile();
        assert_eq!(model.decode(&['a', 'c', 'g']).unwrap(), vec!['M', 'M', 'M']);
    }

    #[test]
    fn lowercase_training_rows_are_accepted() {
        let training = vec![sequence("t1", "acg"), sequence("t2", "acg")];
        let model = ProfileHmm::from_training(&training, &RNA_ALPHABET).unwrap();
        assert_eq!(model.profile_len(), 3);
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let result = ProfileHmm::from_training(&[], &RNA_ALPHABET);
        assert!(matches!(result, Err(HmmError::InvalidModel(_))));
    }

    #[test]
    fn ragged_alignment_is_rejected() {
        let training = vec![sequence("t1", "ACG"), sequence("t2", "AC")];
        let result = ProfileHmm::from_training(&training, &RNA_ALPHABET);
        assert!(matches!(result, Err(HmmError::InvalidModel(_))));
    }

    #[test]
    fn unknown_training_residue_is_rejected() {
        let training = vec![sequence("t1", "AXG"), sequence("t2", "ACG")];
        let result = ProfileHmm::from_training(&training, &RNA_ALPHABET);
        assert_eq!(result.unwrap_err(), HmmError::UnknownSymbol('X'));
    }

    #[test]
    fn all_gap_alignment_is_rejected() {
        let training = vec![sequence("t1", "A-"), sequence("t2", "-A")];
        let result = ProfileHmm::from_training(&training, &RNA_ALPHABET);
        assert!(matches!(result, Err(HmmError::InvalidModel(_))));
    }

    #[test]
    fn empty_observation_is_rejected() {
        let model = tiny_profile();
        assert_eq!(model.decode(&[]).unwrap_err(), HmmError::EmptySequence);
    }

    #[test]
    fn unknown_observation_symbol_is_rejected() {
        let model = tiny_profile();
        // 'T' is not in the RNA alphabet.
        let result = model.decode(&['A', 'T', 'G']);
        assert_eq!(result.unwrap_err(), HmmError::UnknownSymbol('T'));
    }

    #[test]
    fn decoding_is_deterministic() {
        let model = tiny_profile();
        let observations: Vec<char> = "ACGACGCCG".chars().collect();
        let first = model.decode(&observations).unwrap();
        let second = model.decode(&observations).unwrap();
        assert_eq!(first, second);
    }
}
