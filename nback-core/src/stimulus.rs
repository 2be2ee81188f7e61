use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alphabet a session draws its stimuli from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    #[default]
    Letters,
    Digits,
    GridPosition,
}

impl StimulusKind {
    pub const ALL: [StimulusKind; 3] = [
        StimulusKind::Letters,
        StimulusKind::Digits,
        StimulusKind::GridPosition,
    ];

    /// Number of distinct symbols in the alphabet
    pub fn alphabet_len(&self) -> usize {
        match self {
            StimulusKind::Letters => 26,
            StimulusKind::Digits => 10,
            StimulusKind::GridPosition => 9,
        }
    }

    /// Symbol at `index`, wrapping around the end of the alphabet.
    pub fn symbol(&self, index: usize) -> Stimulus {
        let i = (index % self.alphabet_len()) as u8;
        match self {
            StimulusKind::Letters => Stimulus::Letter((b'A' + i) as char),
            StimulusKind::Digits => Stimulus::Digit(i),
            StimulusKind::GridPosition => Stimulus::GridCell(i),
        }
    }

    pub fn alphabet(self) -> impl Iterator<Item = Stimulus> {
        (0..self.alphabet_len()).map(move |i| self.symbol(i))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusKind::Letters => "letters",
            StimulusKind::Digits => "digits",
            StimulusKind::GridPosition => "grid_position",
        }
    }
}

impl fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stimulus kind `{0}` (expected letters, numbers or positions)")]
pub struct ParseStimulusKindError(pub String);

impl FromStr for StimulusKind {
    type Err = ParseStimulusKindError;

    /// Accepts both the form values (`letters`, `numbers`, `positions`)
    /// and the serialized names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letters" | "letter" => Ok(StimulusKind::Letters),
            "numbers" | "number" | "digits" | "digit" => Ok(StimulusKind::Digits),
            "positions" | "position" | "grid" | "grid_position" => Ok(StimulusKind::GridPosition),
            _ => Err(ParseStimulusKindError(s.to_string())),
        }
    }
}

/// A single presented symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stimulus {
    Letter(char),
    Digit(u8),
    /// Row-major index into the 3x3 board
    GridCell(u8),
}

impl Stimulus {
    pub fn kind(&self) -> StimulusKind {
        match self {
            Stimulus::Letter(_) => StimulusKind::Letters,
            Stimulus::Digit(_) => StimulusKind::Digits,
            Stimulus::GridCell(_) => StimulusKind::GridPosition,
        }
    }

    /// (row, column) of a grid cell
    pub fn grid_coords(&self) -> Option<(u8, u8)> {
        match self {
            Stimulus::GridCell(cell) => Some((cell / 3, cell % 3)),
            _ => None,
        }
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stimulus::Letter(c) => write!(f, "{c}"),
            Stimulus::Digit(d) => write!(f, "{d}"),
            Stimulus::GridCell(cell) => write!(f, "#{cell}"),
        }
    }
}
