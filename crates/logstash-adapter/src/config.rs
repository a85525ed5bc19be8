// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::errors::ConfigError;
use crate::route::Route;
use std::env;

const DEFAULT_ADAPTER: &str = "logstash";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Configuration for a forwarder process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    /// Destination of the records
    pub route: Route,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// Capacity of the inbound message queue
    pub queue_capacity: usize,
}

impl ForwarderConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let route = match lookup("LOGSTASH_ROUTE") {
            Some(uri) => Route::parse(&uri)?,
            None => {
                let address = lookup("LOGSTASH_ADDRESS").ok_or(ConfigError::MissingRoute)?;
                Route {
                    adapter: DEFAULT_ADAPTER.to_string(),
                    transport: lookup("LOGSTASH_TRANSPORT"),
                    address,
                    ..Route::default()
                }
            }
        };
        let log_level = lookup("LOGSTASH_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let queue_capacity = match lookup("LOGSTASH_QUEUE_CAPACITY") {
            Some(val) => val.parse::<usize>().map_err(|e| {
                ConfigError::Invalid(format!("LOGSTASH_QUEUE_CAPACITY '{val}': {e}"))
            })?,
            None => DEFAULT_QUEUE_CAPACITY,
        };

        let config = Self {
            route,
            log_level,
            queue_capacity,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.route.adapter != DEFAULT_ADAPTER {
            return Err(ConfigError::Invalid(format!(
                "unable to find adapter: {}",
                self.route.adapter
            )));
        }

        if self.route.address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "destination address cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
