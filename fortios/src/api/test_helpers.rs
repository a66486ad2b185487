//! Test helpers for the FortiOS API

#[cfg(test)]
pub use memory::MemoryTransport;

#[cfg(test)]
pub fn create_test_client(url: &str) -> super::FortiClient {
    super::FortiClient::with_config(
        url,
        "test-api-token",
        super::ClientConfig {
            insecure: true,
            retry: super::RetryConfig {
                max_retries: 0,
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .unwrap()
}
