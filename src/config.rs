//! Configuration types for jasper-exec

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration
///
/// Every value lives on the config (and so on the client built from it), so
/// clients with different settings can run side by side.
///
/// Durations are (de)serialized as milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the report server, e.g. `http://host:8080/jasperserver` (required)
    #[serde(default)]
    pub endpoint: String,

    /// Overall deadline for submission plus polling (default: 300000 ms)
    #[serde(default = "default_timeout", with = "millis_serde")]
    pub timeout: Duration,

    /// Wait between two status reads (default: 5000 ms)
    #[serde(default = "default_poll_delay", with = "millis_serde")]
    pub poll_delay: Duration,

    /// Per-request timeout for submission and status reads (None = only the overall deadline)
    ///
    /// Not applied to the output stream, which may legitimately take longer to drain.
    #[serde(default, with = "optional_millis_serde")]
    pub request_timeout: Option<Duration>,

    /// User-Agent header sent with every request (None = reqwest default)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout: default_timeout(),
            poll_delay: default_poll_delay(),
            request_timeout: None,
            user_agent: None,
        }
    }
}

impl Config {
    /// Configuration for `endpoint` with every other setting at its default
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the overall deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the delay between status reads
    pub fn with_poll_delay(mut self, poll_delay: Duration) -> Self {
        self.poll_delay = poll_delay;
        self
    }

    /// Check the configuration before any network access happens
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(Error::config("endpoint", "must supply endpoint"));
        }

        let parsed = url::Url::parse(endpoint)
            .map_err(|e| Error::config("endpoint", format!("invalid endpoint '{endpoint}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "endpoint",
                format!("unsupported scheme '{}' in endpoint", parsed.scheme()),
            ));
        }

        if self.timeout.is_zero() {
            return Err(Error::config("timeout", "timeout must be greater than zero"));
        }
        if self.poll_delay.is_zero() {
            return Err(Error::config(
                "poll_delay",
                "poll delay must be greater than zero",
            ));
        }
        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config(
                "request_timeout",
                "request timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Endpoint with surrounding whitespace and trailing slashes removed
    pub(crate) fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

// Default value functions
fn default_timeout() -> Duration {
    Duration::from_millis(5 * 60 * 1000)
}

fn default_poll_delay() -> Duration {
    Duration::from_millis(5 * 1000)
}

// Duration serialization helper
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper
mod optional_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
