use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

use crate::websocket::messages::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
}

/// A client's socket to the relay
pub struct Connection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connection {
    /// Connect to the relay's `/ws` endpoint as `username`
    pub async fn connect(relay_url: &str, username: &str) -> Result<Self, ClientError> {
        let query = serde_urlencoded::to_string([("username", username)])?;
        let url = format!("{}?{}", relay_url, query);

        let (stream, _response) = connect_async(url.as_str()).await?;
        tracing::debug!("Connected to relay at {}", relay_url);

        Ok(Self { stream })
    }

    pub async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let json = serde_json::to_string(msg)?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Next message from the relay, or `None` once the socket is closed
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => return Ok(Some(serde_json::from_str(text.as_str())?)),
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
