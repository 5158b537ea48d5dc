use uuid::Uuid;

/// Identity of one logical connection.
///
/// The token is generated once and attached to every request sent over the connection's
/// transport, so the server can correlate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSession {
    id: String,
}

impl ConnectionSession {
    /// Start a session with a fresh random token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Start a session with a caller-chosen token.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}
