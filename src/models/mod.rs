pub mod chess;
pub mod room;

pub use chess::{ChessMove, Color, MoveLogEntry, PromotionPiece};
pub use room::{PlayerInfo, RoomSnapshot};
