use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub rooms: RoomConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the browser client build, served as fallback
    pub static_dir: String,
    /// Capacity of each connection's outbound message queue
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomConfig {
    /// Seconds a room may stay without connected players before removal
    pub empty_grace_secs: u64,
    /// Seconds between two cleanup sweeps
    pub cleanup_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "./public".to_string()),
            channel_capacity: env::var("CHANNEL_CAPACITY")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("CHANNEL_CAPACITY must be a number")?,
        };

        let rooms = RoomConfig {
            empty_grace_secs: env::var("ROOM_EMPTY_GRACE_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
            cleanup_interval_secs: env::var("ROOM_CLEANUP_INTERVAL_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),
        };

        Ok(Config { server, rooms })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn empty_grace_period(&self) -> Duration {
        Duration::from_secs(self.rooms.empty_grace_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.rooms.cleanup_interval_secs.max(1))
    }
}

impl Default for Config {
    /// Defaults used by tests and embedded servers
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                static_dir: "./public".to_string(),
                channel_capacity: 100,
            },
            rooms: RoomConfig {
                empty_grace_secs: 120,
                cleanup_interval_secs: 15,
            },
        }
    }
}
