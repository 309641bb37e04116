pub mod handler;
pub mod messages;

pub use handler::{broadcast_to_room, handle_websocket};
