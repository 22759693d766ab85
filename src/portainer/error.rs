//! Portainer client errors

use thiserror::Error;

/// Errors raised by [`PortainerClient`](super::PortainerClient) operations
#[derive(Error, Debug)]
pub enum PortainerError {
    /// Portainer answered with a non-2xx status
    #[error("Portainer returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request to {url} timed out after {timeout_secs} seconds")]
    Timeout { url: String, timeout_secs: u64 },

    /// Connection refused, DNS failure, TLS failure or a broken body stream
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Membership removal found no membership for the user; no delete was sent
    #[error("User {user_id} is not a member of team {team_id}")]
    NotAMember { team_id: u64, user_id: u64 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl PortainerError {
    /// Upstream HTTP status, when Portainer actually answered
    pub fn status(&self) -> Option<u16> {
        match self {
            PortainerError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True for failures where no response was received
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PortainerError::Timeout { .. } | PortainerError::Transport { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PortainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status() {
        let err = PortainerError::Upstream {
            status: 404,
            body: "{\"message\":\"Object not found inside the database\"}".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(!err.is_transport());
        assert!(err.to_string().contains("Object not found"));
    }

    #[test]
    fn test_not_a_member_message() {
        let err = PortainerError::NotAMember {
            team_id: 5,
            user_id: 42,
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "User 42 is not a member of team 5");
    }

    #[test]
    fn test_transport_classification() {
        let err = PortainerError::Timeout {
            url: "https://portainer.local/api/endpoints".to_string(),
            timeout_secs: 30,
        };
        assert!(err.is_transport());
        assert!(err.to_string().contains("30 seconds"));
    }
}
