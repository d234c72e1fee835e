//! Reports invocation outcomes to the webhook sender's callback URL.

use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{self, info, warn};

use crate::error::{AutodockError, Result};
use crate::webhook::{InvocationState, StateBody};

#[derive(Debug, Clone)]
pub struct CallbackReporter {
    client: reqwest::Client,
    timeout: Duration,
}

impl CallbackReporter {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    /// POSTs `{"state": "<state>"}` to `url` and logs the reply.
    /// Non-2xx replies are logged but not treated as errors.
    pub async fn report(&self, url: &str, state: InvocationState) -> Result<()> {
        info!("Reporting '{}' to {}", state.as_str(), url);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&StateBody::from(state))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let headers = format!("{:?}", response.headers());
        let body = response.text().await.map_err(|e| self.classify(e))?;

        info!("Callback response status: {}", status);
        info!("Callback response headers: {}", headers);
        info!("Callback response body: {}", body);

        if !status.is_success() {
            warn!("Callback {} answered {}", url, status);
        }

        Ok(())
    }

    fn classify(&self, err: reqwest::Error) -> AutodockError {
        if err.is_timeout() {
            AutodockError::CallbackTimeout(self.timeout)
        } else {
            AutodockError::Callback(err)
        }
    }
}
