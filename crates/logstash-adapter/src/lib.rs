// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Enriches container log lines with orchestration metadata and ships them to a
//! Logstash collector as newline-delimited JSON.
//!
//! ```text
//!   LogMessage ──> metadata (cached tags) ──> record ──> Connection
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod adapter;
pub mod cache;
pub mod config;
pub mod container;
pub mod errors;
pub mod metadata;
pub mod record;
pub mod route;
pub mod transport;
