use crate::MatchError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PRODUCT_NAME: &str = "Resume Match";

/// Where the ranking service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MatchError> {
        Ok(Self {
            base_url: normalize_base(Url::parse(base_url)?),
            timeout,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, MatchError> {
        Ok(self.base_url.join(path)?)
    }

    /// `{base}/resumes/{file_name}` with the name encoded as a single segment.
    pub fn resume_url(&self, file_name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("resumes").push(file_name);
        }
        url
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_SERVICE_URL).expect("default service url is valid"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// Url::join drops the last path segment unless the base ends with '/'.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub service: ServiceConfig,
    pub product_name: String,
}

impl ConsoleConfig {
    pub fn new(service: ServiceConfig) -> Self {
        Self {
            service,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}
