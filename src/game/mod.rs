// Rules handling is delegated to shakmaty; this module only adapts it

pub mod engine;
pub mod outcome;

pub use engine::{ChessError, ChessGame, PlayedMove};
pub use outcome::Outcome;
