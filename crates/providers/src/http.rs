use std::time::Duration;

use rand::Rng;
use reqwest::{Client, Response};

use crate::provider::FetchError;

// Pool of desktop user agents rotated between client instances; some
// reservation APIs reject requests with a default library agent.
const USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
];

/// Build an HTTP client with a browser user agent and a request timeout.
pub(crate) fn build_client() -> Result<Client, FetchError> {
    let user_agent = USER_AGENTS[rand::rng().random_range(0..USER_AGENTS.len())];

    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .build()?;

    Ok(client)
}

/// Map a non-success response to a [`FetchError`], passing success through.
pub(crate) async fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 429 {
        return Err(FetchError::RateLimited);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read response body".to_string());

    Err(FetchError::Status {
        status: status.as_u16(),
        body,
    })
}
