// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the forwarding pipeline.

/// Failure while forwarding a single log message.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The record could not be encoded; the message is dropped.
    #[error("could not marshal JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The connection refused the write. Unrecoverable for the forwarder.
    #[error("could not write: {0}")]
    Write(#[source] std::io::Error),
}

impl ForwardError {
    /// Fatal errors end the forwarder; everything else only costs one message.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ForwardError::Write(_))
    }
}

/// Failure while looking up or dialing a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("unable to find transport: {0}")]
    Unknown(String),

    #[error("invalid value '{value}' for transport option '{option}'")]
    InvalidOption { option: String, value: String },

    #[error("could not resolve address: {0}")]
    Resolve(String),

    #[error("could not dial {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while parsing a route URI.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route is missing '://': {0}")]
    MissingScheme(String),

    #[error("route has no adapter: {0}")]
    MissingAdapter(String),

    #[error("route has no address: {0}")]
    MissingAddress(String),

    #[error("malformed route option '{0}'")]
    MalformedOption(String),
}

/// Failure while loading forwarder configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("neither LOGSTASH_ROUTE nor LOGSTASH_ADDRESS is set")]
    MissingRoute,

    #[error("invalid route: {0}")]
    Route(#[from] RouteError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
