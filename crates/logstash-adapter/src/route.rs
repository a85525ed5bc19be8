// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Route URIs of the form `adapter[+transport]://address[?option=value&...]`.

use crate::errors::RouteError;
use std::collections::HashMap;
use std::fmt;

/// A configured destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub adapter: String,
    pub transport: Option<String>,
    pub address: String,
    pub options: HashMap<String, String>,
}

impl Route {
    /// Parses a route URI such as `logstash+tcp://collector:5000?nodelay=true`.
    pub fn parse(uri: &str) -> Result<Self, RouteError> {
        let uri = uri.trim();
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| RouteError::MissingScheme(uri.to_string()))?;

        let (adapter, transport) = match scheme.split_once('+') {
            Some((adapter, transport)) => (adapter, Some(transport)),
            None => (scheme, None),
        };
        if adapter.is_empty() {
            return Err(RouteError::MissingAdapter(uri.to_string()));
        }

        let (address, query) = match rest.split_once('?') {
            Some((address, query)) => (address, Some(query)),
            None => (rest, None),
        };
        let address = address.trim_end_matches('/');
        if address.is_empty() {
            return Err(RouteError::MissingAddress(uri.to_string()));
        }

        let mut options = HashMap::new();
        for pair in query.unwrap_or_default().split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| RouteError::MalformedOption(pair.to_string()))?;
            if key.is_empty() {
                return Err(RouteError::MalformedOption(pair.to_string()));
            }
            options.insert(key.to_string(), value.to_string());
        }

        Ok(Route {
            adapter: adapter.to_string(),
            transport: transport.filter(|t| !t.is_empty()).map(str::to_string),
            address: address.to_string(),
            options,
        })
    }

    /// Name of the transport this route asks for, or `default`.
    #[must_use]
    pub fn adapter_transport<'a>(&'a self, default: &'a str) -> &'a str {
        self.transport.as_deref().unwrap_or(default)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.adapter)?;
        if let Some(transport) = &self.transport {
            write!(f, "+{}", transport)?;
        }
        write!(f, "://{}", self.address)
    }
}
