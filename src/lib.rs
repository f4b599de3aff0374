//! Log-space Viterbi decoding for discrete hidden Markov models.
//!
//! The crate centers on [`HiddenMarkovModel`]: construct it once from
//! plain-probability parameters (validated, then converted to natural-log
//! space) and call [`HiddenMarkovModel::decode`] on as many observation
//! sequences as needed. Two model sources ship with the crate: the
//! textbook dishonest-casino preset ([`casino_model`]) and a profile HMM
//! derived from an aligned FASTA training set ([`ProfileHmm`]).
//!
//! ```
//! use hmm_decode::casino_model;
//!
//! let model = casino_model();
//! let rolls: Vec<char> = "266666".chars().collect();
//! let path = model.decode(&rolls).unwrap();
//! assert_eq!(path.len(), rolls.len());
//! ```

pub mod error;
pub mod hmm;
pub mod io;

pub use error::{FastaError, HmmError, Result};
pub use hmm::{casino_model, HiddenMarkovModel, ProfileHmm};
pub use io::{read_fasta, Sequence};
