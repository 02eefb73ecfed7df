use std::io::Read;
use std::time::Duration;

use crate::config::ServiceSettings;
use crate::error::FetchError;

use super::types::Blob;

const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Downloads one audio byte stream.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Blob, FetchError>;
}

/// Plain HTTP GET via `ureq`, body read to the end.
pub struct HttpFetcher {
    http_client: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(settings: &ServiceSettings) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(settings.connect_timeout_ms))
            .timeout_read(Duration::from_millis(settings.read_timeout_ms))
            .build();
        Self { http_client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Blob, FetchError> {
        let response = self.http_client.get(url).call()?;

        let mut bytes = match response
            .header("Content-Length")
            .and_then(|v| v.parse::<usize>().ok())
        {
            Some(len) => Vec::with_capacity(len.min(MAX_PREALLOC)),
            None => Vec::new(),
        };
        response.into_reader().read_to_end(&mut bytes)?;

        log::debug!("fetched {} bytes from {url}", bytes.len());
        Ok(Blob::from(bytes))
    }
}
