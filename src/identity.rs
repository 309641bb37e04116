use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use uuid::Uuid;

/// Name used until the client picks one
pub const DEFAULT_USERNAME: &str = "Anonymous";
/// Longest display name kept, in characters
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Identity of one socket connection. The id plays the role of a socket id:
/// a fresh one per connection, never reused.
#[derive(Debug, Clone)]
pub struct PlayerIdentity {
    pub player_id: Uuid,
    pub username: String,
}

impl PlayerIdentity {
    pub fn new(username: &str) -> Self {
        Self {
            player_id: Uuid::new_v4(),
            username: sanitize_username(username),
        }
    }
}

/// Extractor reading the optional `username` query parameter of the upgrade request
impl<S> FromRequestParts<S> for PlayerIdentity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = match parts.uri.query() {
            Some(query) => serde_urlencoded::from_str::<Vec<(String, String)>>(query)
                .map_err(|_| StatusCode::BAD_REQUEST)?,
            None => Vec::new(),
        };

        let username = params
            .iter()
            .find(|(k, _)| k == "username")
            .map(|(_, v)| v.as_str())
            .unwrap_or(DEFAULT_USERNAME);

        Ok(PlayerIdentity::new(username))
    }
}

/// Trim and bound a display name, falling back to the default when blank
pub fn sanitize_username(raw: &str) -> String {
    let trimmed: String = raw.trim().chars().take(MAX_USERNAME_LENGTH).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        trimmed.to_string()
    }
}
