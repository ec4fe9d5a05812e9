//! Process configuration read from environment variables.

use std::env;
use std::time::Duration;

use crate::consumer::MAX_PROGRESS_INTERVAL;
use crate::orchestrator::OrchestratorConfig;
use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default destination index.
const DEFAULT_INDEX_NAME: &str = "events";

/// Default capacity of the in-process message queue.
const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Largest accepted message queue capacity.
const MAX_QUEUE_CAPACITY: u64 = 1_000_000;

/// Default progress logging interval in seconds.
const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 10;

/// Settings for one indexer process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Index engine endpoint.
    pub opensearch_url: String,
    /// Initial destination index.
    pub index_name: String,
    /// Capacity of the bounded message queue.
    pub queue_capacity: usize,
    /// Per-submission timeout; `None` waits for the engine indefinitely.
    pub submit_timeout: Option<Duration>,
    /// Interval between progress log lines.
    pub progress_interval: Duration,
}

impl IndexerConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: Index engine URL (default: http://localhost:9200)
    /// - `INDEX_NAME`: Destination index (default: "events")
    /// - `QUEUE_CAPACITY`: Message queue capacity (default: 1000)
    /// - `SUBMIT_TIMEOUT_SECS`: Per-submission timeout in seconds (default: none)
    /// - `PROGRESS_INTERVAL_SECS`: Progress log interval in seconds (default: 10)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());

        let index_name = lookup("INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string());
        if index_name.trim().is_empty() {
            return Err(IndexingError::config("INDEX_NAME must not be empty"));
        }

        let queue_capacity = match parse_number(&lookup, "QUEUE_CAPACITY")? {
            None => DEFAULT_QUEUE_CAPACITY,
            Some(capacity) if (1..=MAX_QUEUE_CAPACITY).contains(&capacity) => capacity as usize,
            Some(_) => {
                return Err(IndexingError::config(format!(
                    "QUEUE_CAPACITY must be between 1 and {}",
                    MAX_QUEUE_CAPACITY
                )))
            }
        };

        let submit_timeout = match parse_number(&lookup, "SUBMIT_TIMEOUT_SECS")? {
            Some(0) => {
                return Err(IndexingError::config(
                    "SUBMIT_TIMEOUT_SECS must be at least 1 (unset it to disable the timeout)",
                ))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let progress_interval_secs = parse_number(&lookup, "PROGRESS_INTERVAL_SECS")?
            .unwrap_or(DEFAULT_PROGRESS_INTERVAL_SECS);
        let max_progress_secs = MAX_PROGRESS_INTERVAL.as_secs();
        if progress_interval_secs == 0 || progress_interval_secs > max_progress_secs {
            return Err(IndexingError::config(format!(
                "PROGRESS_INTERVAL_SECS must be between 1 and {}",
                max_progress_secs
            )));
        }

        Ok(Self {
            opensearch_url,
            index_name,
            queue_capacity,
            submit_timeout,
            progress_interval: Duration::from_secs(progress_interval_secs),
        })
    }

    /// The orchestrator settings derived from this configuration.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            progress_interval: self.progress_interval,
            submit_timeout: self.submit_timeout,
        }
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|e| {
            IndexingError::config(format!("Invalid {} value '{}': {}", key, raw, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<IndexerConfig, IndexingError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IndexerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.index_name, "events");
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.submit_timeout, None);
        assert_eq!(config.progress_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENSEARCH_URL", "http://search:9200"),
            ("INDEX_NAME", "tracking-2024"),
            ("QUEUE_CAPACITY", "64"),
            ("SUBMIT_TIMEOUT_SECS", "30"),
            ("PROGRESS_INTERVAL_SECS", " 5 "),
        ])
        .unwrap();

        assert_eq!(config.opensearch_url, "http://search:9200");
        assert_eq!(config.index_name, "tracking-2024");
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.submit_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.progress_interval, Duration::from_secs(5));

        let orchestrator_config = config.orchestrator_config();
        assert_eq!(orchestrator_config.submit_timeout, Some(Duration::from_secs(30)));
        assert_eq!(orchestrator_config.progress_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        for (key, value) in [
            ("QUEUE_CAPACITY", "lots"),
            ("QUEUE_CAPACITY", "0"),
            ("QUEUE_CAPACITY", "1000001"),
            ("SUBMIT_TIMEOUT_SECS", "-1"),
            ("SUBMIT_TIMEOUT_SECS", "0"),
            ("PROGRESS_INTERVAL_SECS", "0"),
            ("PROGRESS_INTERVAL_SECS", "86401"),
            ("PROGRESS_INTERVAL_SECS", "18446744073709551615"),
        ] {
            let result = config_from(&[(key, value)]);
            assert!(
                matches!(result, Err(IndexingError::ConfigError(_))),
                "expected config error for {}={}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_progress_interval_upper_bound_is_accepted() {
        let config = config_from(&[("PROGRESS_INTERVAL_SECS", "86400")]).unwrap();
        assert_eq!(config.progress_interval, MAX_PROGRESS_INTERVAL);
    }

    #[test]
    fn test_empty_index_name_is_rejected() {
        let result = config_from(&[("INDEX_NAME", "  ")]);
        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }
}
