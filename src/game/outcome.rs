use std::fmt;

use crate::models::Color;

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The given side delivered mate
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    /// Halfmove clock reached 100
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl Outcome {
    pub fn is_draw(self) -> bool {
        !matches!(self, Outcome::Checkmate { .. })
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

/// The message shown in the game-over dialog
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "Checkmate! {} wins!", winner),
            _ => f.write_str("Draw"),
        }
    }
}
