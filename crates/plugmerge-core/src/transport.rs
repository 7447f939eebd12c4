//! Registry transport.
//!
//! The fetcher only needs "give me these bytes" and "does this exist";
//! [`HttpTransport`] implements both over a blocking reqwest client.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Minimal HTTP-like access to the artifact registry.
pub trait Transport {
    /// Download the body at `url`.
    fn get(&self, url: &str) -> Result<Vec<u8>>;

    /// Check that `url` exists without downloading it.
    fn head(&self, url: &str) -> Result<()>;
}

/// Blocking HTTP transport with an explicit timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plugmerge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder, url: &str) -> Result<reqwest::blocking::Response> {
        let response = request.send().map_err(|e| Error::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "GET");
        let response = self.send(self.client.get(url), url)?;
        let bytes = response.bytes().map_err(|e| Error::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;
        Ok(bytes.to_vec())
    }

    fn head(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "HEAD");
        self.send(self.client.head(url), url).map(|_| ())
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url)
    }

    fn head(&self, url: &str) -> Result<()> {
        (**self).head(url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        (**self).get(url)
    }

    fn head(&self, url: &str) -> Result<()> {
        (**self).head(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(HttpTransport::new(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_millis(500)).unwrap();
        // Port 9 on localhost: nothing listens there in test environments
        let err = transport.get("http://127.0.0.1:9/x.zip").unwrap_err();
        assert!(matches!(err, Error::Transport { .. }), "got {err:?}");
    }
}
