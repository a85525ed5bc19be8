// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transports that dial the connection records are written to.
//!
//! A [`TransportRegistry`] maps transport names (as used in routes, e.g. the
//! `tcp` of `logstash+tcp://host:5000`) to [`Transport`] implementations.
//! `udp` and `tcp` are built in. Options come from the route query string and
//! are interpreted by each transport; unknown options are ignored.

use crate::errors::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

/// Transport used when a route names none.
pub const DEFAULT_TRANSPORT: &str = "udp";

/// An established, writable connection to the collector.
#[async_trait]
pub trait Connection: Send {
    /// Writes one framed record.
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;

    /// Flushes and closes the connection.
    async fn close(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Dials connections for one kind of transport.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn dial(
        &self,
        address: &str,
        options: &HashMap<String, String>,
    ) -> Result<Box<dyn Connection>, TransportError>;
}

/// Named transports available to routes.
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl TransportRegistry {
    /// Registry holding the `udp` and `tcp` transports.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(UdpTransport));
        registry.register(Arc::new(TcpTransport));
        registry
    }

    /// Adds `transport`, replacing any transport registered under the same name.
    pub fn register(&mut self, transport: Arc<dyn Transport>) {
        self.transports
            .insert(transport.name().to_string(), transport);
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Transport>, TransportError> {
        self.transports
            .get(name)
            .cloned()
            .ok_or_else(|| TransportError::Unknown(name.to_string()))
    }
}

/// Sends every record as a single datagram on a connected socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport;

pub struct UdpConnection {
    socket: UdpSocket,
}

#[async_trait]
impl Transport for UdpTransport {
    fn name(&self) -> &'static str {
        "udp"
    }

    async fn dial(
        &self,
        address: &str,
        _options: &HashMap<String, String>,
    ) -> Result<Box<dyn Connection>, TransportError> {
        let remote = resolve(address).await?;
        let local = match remote {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        let dial_error = |source| TransportError::Dial {
            address: address.to_string(),
            source,
        };

        let socket = UdpSocket::bind(local).await.map_err(dial_error)?;
        socket.connect(remote).await.map_err(dial_error)?;
        debug!("udp: connected to {}", remote);
        Ok(Box::new(UdpConnection { socket }))
    }
}

#[async_trait]
impl Connection for UdpConnection {
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        let sent = self.socket.send(buf).await?;
        if sent != buf.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("datagram truncated: sent {} of {} bytes", sent, buf.len()),
            ));
        }
        Ok(())
    }
}

/// Writes records to a TCP stream. Supports the `nodelay` option (`true`/`false`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

pub struct TcpConnection {
    stream: TcpStream,
}

#[async_trait]
impl Transport for TcpTransport {
    fn name(&self) -> &'static str {
        "tcp"
    }

    async fn dial(
        &self,
        address: &str,
        options: &HashMap<String, String>,
    ) -> Result<Box<dyn Connection>, TransportError> {
        let nodelay = bool_option(options, "nodelay")?;
        let remote = resolve(address).await?;
        let dial_error = |source| TransportError::Dial {
            address: address.to_string(),
            source,
        };

        let stream = TcpStream::connect(remote).await.map_err(dial_error)?;
        if let Some(nodelay) = nodelay {
            stream.set_nodelay(nodelay).map_err(dial_error)?;
        }
        debug!("tcp: connected to {}", remote);
        Ok(Box::new(TcpConnection { stream }))
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(buf).await
    }

    async fn close(&mut self) -> std::io::Result<()> {
        self.stream.shutdown().await
    }
}

async fn resolve(address: &str) -> Result<SocketAddr, TransportError> {
    tokio::net::lookup_host(address)
        .await
        .map_err(|e| TransportError::Resolve(format!("{address}: {e}")))?
        .next()
        .ok_or_else(|| TransportError::Resolve(address.to_string()))
}

fn bool_option(
    options: &HashMap<String, String>,
    option: &str,
) -> Result<Option<bool>, TransportError> {
    options
        .get(option)
        .map(|value| match value.to_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(TransportError::InvalidOption {
                option: option.to_string(),
                value: value.clone(),
            }),
        })
        .transpose()
}
