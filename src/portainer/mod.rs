//! Portainer API client module
//!
//! Translates each logical operation into exactly one Portainer REST call
//! (two for team membership removal) and returns the decoded JSON response.

mod access;
mod client;
mod docker;
mod error;
mod kubernetes;
mod models;
mod request;
mod stacks;

pub use client::{status_object, ClientSettings, PortainerClient};
pub use error::PortainerError;
pub use models::{RepositoryStack, DEFAULT_NETWORK_DRIVER, DEFAULT_ROLE, DEFAULT_VOLUME_DRIVER};

#[cfg(test)]
pub(crate) mod test_support {
    use super::{ClientSettings, PortainerClient};

    pub const API_KEY: &str = "ptr_test_key";

    /// Client pointed at a mockito server
    pub fn mock_client(server: &mockito::ServerGuard) -> PortainerClient {
        PortainerClient::new(ClientSettings::new(server.url(), API_KEY).with_timeout(5))
            .expect("mock client")
    }
}
