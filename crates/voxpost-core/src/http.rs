//! Shared HTTP client for AI calls.

use anyhow::Result;
use once_cell::sync::OnceCell;
use reqwest::Client;

static HTTP_CLIENT: OnceCell<Client> = OnceCell::new();

/// Get the lazily-built shared client. Connection pooling across calls
/// matters here: back-to-back utterances hit the same endpoint.
pub fn get_http_client() -> Result<&'static Client> {
    HTTP_CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(concat!("voxpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Into::into)
    })
}
