#![allow(dead_code)]

//! RIASEC assessment — Likert answer interpretation and trait scoring.
//!
//! The scoring path is deliberately infallible: a completed assessment must
//! always produce a profile. Unknown questions are skipped, unrecognized
//! answer labels degrade to the neutral level.

pub mod handlers;
pub mod likert;
pub mod profile;
pub mod questions;

use serde::{Deserialize, Serialize};

/// One of the six RIASEC personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    R,
    I,
    A,
    S,
    E,
    C,
}

impl Dimension {
    /// Canonical R-I-A-S-E-C order. Also the tie-break order when two
    /// dimensions have exactly equal raw means.
    pub const ALL: [Dimension; 6] = [
        Dimension::R,
        Dimension::I,
        Dimension::A,
        Dimension::S,
        Dimension::E,
        Dimension::C,
    ];

    pub fn letter(self) -> char {
        match self {
            Dimension::R => 'R',
            Dimension::I => 'I',
            Dimension::A => 'A',
            Dimension::S => 'S',
            Dimension::E => 'E',
            Dimension::C => 'C',
        }
    }

    pub fn from_letter(c: char) -> Option<Dimension> {
        match c.to_ascii_uppercase() {
            'R' => Some(Dimension::R),
            'I' => Some(Dimension::I),
            'A' => Some(Dimension::A),
            'S' => Some(Dimension::S),
            'E' => Some(Dimension::E),
            'C' => Some(Dimension::C),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_round_trip() {
        for dim in Dimension::ALL {
            assert_eq!(Dimension::from_letter(dim.letter()), Some(dim));
        }
    }

    #[test]
    fn test_from_letter_is_case_insensitive() {
        assert_eq!(Dimension::from_letter('r'), Some(Dimension::R));
        assert_eq!(Dimension::from_letter('x'), None);
    }
}
