// Client side of a game: lobby, board state and the relay socket

pub mod connection;
pub mod lobby;
pub mod session;
pub mod view;

pub use connection::{ClientError, Connection};
pub use lobby::{Lobby, LobbyEvent};
pub use session::{ClientSession, Command, Response};
pub use view::GameView;
