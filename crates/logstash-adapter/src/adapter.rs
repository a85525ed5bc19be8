// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Logstash adapter: enriches log messages and forwards them to a collector.
//!
//! The adapter owns one connection and one metadata cache. It pulls messages from its
//! inbound queue strictly in arrival order, so records reach the collector in
//! the order they were captured. The loop ends when the queue is closed, or on
//! the first failed write: there is no reconnect, retry or buffering.

use crate::cache::{ContainerMetadataCache, MetadataCache};
use crate::container::{Container, LogMessage};
use crate::errors::{ForwardError, TransportError};
use crate::metadata::{extract, ContainerMetadata};
use crate::record::{compose, encode};
use crate::route::Route;
use crate::transport::{Connection, TransportRegistry, DEFAULT_TRANSPORT};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// Forwards enriched log records over a single connection.
pub struct LogstashAdapter {
    route: Route,
    connection: Box<dyn Connection>,
    cache: Box<dyn MetadataCache>,
}

impl LogstashAdapter {
    /// Dials the route's transport (UDP unless the route names another one).
    pub async fn new(route: Route, registry: &TransportRegistry) -> Result<Self, TransportError> {
        let transport = registry.lookup(route.adapter_transport(DEFAULT_TRANSPORT))?;
        let connection = transport.dial(&route.address, &route.options).await?;
        debug!("logstash: forwarding to {}", route);

        Ok(Self::with_connection(
            route,
            connection,
            Box::new(ContainerMetadataCache::new()),
        ))
    }

    /// Builds an adapter around an already established connection.
    #[must_use]
    pub fn with_connection(
        route: Route,
        connection: Box<dyn Connection>,
        cache: Box<dyn MetadataCache>,
    ) -> Self {
        LogstashAdapter {
            route,
            connection,
            cache,
        }
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Forwards every message of `logstream` until it is closed.
    ///
    /// Returns `Ok(())` once the stream is exhausted. A failed write closes the
    /// connection and returns the fatal [`ForwardError::Write`]; the adapter cannot
    /// be restarted and a new one has to be built with a fresh connection.
    pub async fn stream(
        mut self,
        mut logstream: mpsc::Receiver<LogMessage>,
    ) -> Result<(), ForwardError> {
        debug!("logstash: adapter started");

        while let Some(message) = logstream.recv().await {
            match self.forward(&message).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    error!("logstash: {}", e);
                    logstream.close();
                    self.shutdown().await;
                    return Err(e);
                }
                // Only this message is lost
                Err(e) => error!("logstash: {}", e),
            }
        }

        debug!("logstash: inbound stream closed");
        self.shutdown().await;
        Ok(())
    }

    /// Enriches, encodes and writes a single message.
    pub async fn forward(&mut self, message: &LogMessage) -> Result<(), ForwardError> {
        let container = &message.container;
        let docker = container.identity();
        let metadata = self.container_metadata(container);

        let record = compose(
            &message.data,
            &message.source,
            &docker,
            &metadata.tags,
            &metadata.scheduler,
        )?;
        let frame = encode(&record)?;
        trace!("logstash: sending {} bytes for {}", frame.len(), container.id);

        self.connection
            .write_all(&frame)
            .await
            .map_err(ForwardError::Write)
    }

    fn container_metadata(&self, container: &Container) -> Arc<ContainerMetadata> {
        self.cache
            .lookup_or_compute(&container.id, &mut || extract(&container.env))
    }

    async fn shutdown(&mut self) {
        debug!(
            "logstash: closing connection, {} containers cached",
            self.cache.len()
        );
        if let Err(e) = self.connection.close().await {
            debug!("logstash: failed to close connection: {}", e);
        }
    }
}
