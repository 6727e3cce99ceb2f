pub mod chat_completions;
pub mod gemini;
pub mod mock;

use std::time::Duration;

use codeocr_core::OcrError;
use reqwest::{Client, Response};

/// Longest slice of an error body carried into a transport error.
const ERROR_BODY_LIMIT: usize = 300;

/// One HTTP client per backend, so each keeps its own connection pool.
pub(crate) fn build_client(timeout_secs: Option<u64>) -> reqwest::Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Buffer the whole body; non-2xx statuses become transport errors.
pub(crate) async fn read_body(provider: &str, response: Response) -> Result<String, OcrError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| OcrError::transport(provider, format!("reading body failed: {e}")))?;

    if !status.is_success() {
        let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        return Err(OcrError::transport(provider, format!("{status}: {excerpt}")));
    }
    Ok(body)
}

pub(crate) fn missing_secret(provider: &str) -> OcrError {
    OcrError::Config(format!("{provider}.secret is not configured"))
}

/// In-process HTTP server standing in for a remote provider.
#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral port and return its base URL.
    pub async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
