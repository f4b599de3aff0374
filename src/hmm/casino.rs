//! The dishonest-casino model from Durbin et al., "Biological Sequence
//! Analysis" (pp. 54-57): a casino that occasionally swaps a fair die for
//! one loaded towards six.

use ndarray::array;

use crate::hmm::model::HiddenMarkovModel;

/// Build the canonical two-state biased-die model.
///
/// States are `F` (fair) and `L` (loaded); observations are the die faces
/// `1` through `6`. The fair die emits uniformly, the loaded die emits a
/// six half of the time, and the chain strongly prefers staying in its
/// current state (0.95 fair, 0.9 loaded).
pub fn casino_model() -> HiddenMarkovModel {
    HiddenMarkovModel::new(
        vec!['F', 'L'],
        vec!['1', '2', '3', '4', '5', '6'],
        array![0.5, 0.5],
        array![[0.95, 0.05], [0.1, 0.9]],
        array![
            [1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0],
            [0.1, 0.1, 0.1, 0.1, 0.1, 0.5],
        ],
    )
    .expect("hard-coded casino parameters are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casino_model_shape() {
        let model = casino_model();
        assert_eq!(model.num_states(), 2);
        assert_eq!(model.num_symbols(), 6);
        assert_eq!(model.state_label(0), 'F');
        assert_eq!(model.state_label(1), 'L');
    }

    #[test]
    fn faces_map_in_order() {
        let model = casino_model();
        for (index, face) in ['1', '2', '3', '4', '5', '6'].into_iter().enumerate() {
            assert_eq!(model.symbol_index(face).unwrap(), index);
        }
    }
}
