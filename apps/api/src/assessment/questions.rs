//! Static question-to-dimension map for the RIASEC questionnaire.
//!
//! Question ids are assigned by the assessment UI and never change between
//! releases; five questions probe each dimension.

use crate::assessment::Dimension;

/// (question id, dimension) pairs for the full questionnaire.
pub const QUESTION_DIMENSIONS: &[(u32, Dimension)] = &[
    (1, Dimension::R),
    (2, Dimension::I),
    (3, Dimension::A),
    (4, Dimension::S),
    (5, Dimension::E),
    (6, Dimension::C),
    (7, Dimension::R),
    (8, Dimension::I),
    (9, Dimension::A),
    (10, Dimension::S),
    (11, Dimension::E),
    (12, Dimension::C),
    (13, Dimension::R),
    (14, Dimension::I),
    (15, Dimension::A),
    (16, Dimension::S),
    (17, Dimension::E),
    (18, Dimension::C),
    (19, Dimension::R),
    (20, Dimension::I),
    (21, Dimension::A),
    (22, Dimension::S),
    (23, Dimension::E),
    (24, Dimension::C),
    (25, Dimension::R),
    (26, Dimension::I),
    (27, Dimension::A),
    (28, Dimension::S),
    (29, Dimension::E),
    (30, Dimension::C),
];

/// Looks up the dimension a question contributes to.
pub fn dimension_for(question_id: u32) -> Option<Dimension> {
    QUESTION_DIMENSIONS
        .iter()
        .find(|(id, _)| *id == question_id)
        .map(|(_, dim)| *dim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dimension_has_five_questions() {
        for dim in Dimension::ALL {
            let count = QUESTION_DIMENSIONS
                .iter()
                .filter(|(_, d)| *d == dim)
                .count();
            assert_eq!(count, 5, "dimension {dim:?}");
        }
    }

    #[test]
    fn test_known_and_unknown_ids() {
        assert_eq!(dimension_for(1), Some(Dimension::R));
        assert_eq!(dimension_for(30), Some(Dimension::C));
        assert_eq!(dimension_for(31), None);
        assert_eq!(dimension_for(0), None);
    }
}
