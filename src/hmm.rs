pub mod casino;
pub mod model;
pub mod profile;
pub mod viterbi;

pub use casino::casino_model;
pub use model::HiddenMarkovModel;
pub use profile::{ProfileHmm, RNA_ALPHABET};
