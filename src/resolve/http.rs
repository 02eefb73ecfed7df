use std::time::Duration;

use crate::config::ServiceSettings;
use crate::error::ResolveError;

use super::{Resolver, VideoRecord};

/// `POST {base_url}/load` with `{"id": ...}`.
pub struct HttpResolver {
    http_client: ureq::Agent,
    base_url: String,
}

impl HttpResolver {
    pub fn new(settings: &ServiceSettings) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(settings.connect_timeout_ms))
            .timeout_read(Duration::from_millis(settings.read_timeout_ms))
            .build();
        Self {
            http_client,
            base_url: settings.base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn load_url(&self) -> String {
        format!("{}/load", self.base_url)
    }
}

impl Resolver for HttpResolver {
    fn resolve(&self, id: &str) -> Result<VideoRecord, ResolveError> {
        let response = self
            .http_client
            .post(&self.load_url())
            .send_json(ureq::json!({ "id": id }))?;

        let record: VideoRecord = response
            .into_json()
            .map_err(|e| ResolveError::Decode(e.to_string()))?;

        if record.id != id {
            log::warn!("resolver answered {} for requested id {id}", record.id);
        }
        Ok(record)
    }
}
