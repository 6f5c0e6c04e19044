//! Common test utilities

use memoreq::{RequestClient, RequestConfig};
use mockito::{Server, ServerGuard};

/// Create a mock HTTP server for testing
#[allow(dead_code)] // Used by other test modules
pub async fn create_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Setup a test client pointing to a mock server
#[allow(dead_code)] // Used by other test modules
pub async fn setup_test_client() -> (RequestClient, ServerGuard) {
    let server = create_mock_server().await;
    let config = RequestConfig::json(server.url()).with_timeout(std::time::Duration::from_secs(5));
    let client = RequestClient::new(config).unwrap();
    (client, server)
}
