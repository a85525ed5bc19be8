// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Composition and framing of outbound records.
//!
//! A log line that already is a JSON object keeps all of its keys and gets
//! `docker`, `tags`, `stream` and `marathon` set on it, replacing any value the
//! application wrote under those names. Any other line is wrapped:
//!
//! ```text
//! {"message":"<line>","docker":{..},"marathon":{..},"stream":"stdout","tags":[..]}
//! ```
//!
//! `marathon` is left out whenever the container carries no scheduler metadata.

use crate::container::ContainerIdentity;
use crate::errors::ForwardError;
use crate::metadata::{SchedulerMetadata, Tags};
use serde::Serialize;
use serde_json::{Map, Value};

const DOCKER_KEY: &str = "docker";
const TAGS_KEY: &str = "tags";
const STREAM_KEY: &str = "stream";
const MARATHON_KEY: &str = "marathon";

/// Frame delimiter understood by Logstash's `json_lines` codec.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Record built around a line that is not a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedRecord<'a> {
    pub message: &'a str,
    pub docker: &'a ContainerIdentity,
    #[serde(skip_serializing_if = "SchedulerMetadata::is_empty")]
    pub marathon: &'a SchedulerMetadata,
    pub stream: &'a str,
    pub tags: &'a Tags,
}

/// What is sent for one log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundRecord<'a> {
    Wrapped(WrappedRecord<'a>),
    Merged(Map<String, Value>),
}

/// Builds the outbound record for `data`.
pub fn compose<'a>(
    data: &'a str,
    stream: &'a str,
    docker: &'a ContainerIdentity,
    tags: &'a Tags,
    marathon: &'a SchedulerMetadata,
) -> Result<OutboundRecord<'a>, ForwardError> {
    let Ok(mut fields) = serde_json::from_str::<Map<String, Value>>(data) else {
        return Ok(OutboundRecord::Wrapped(WrappedRecord {
            message: data,
            docker,
            marathon,
            stream,
            tags,
        }));
    };

    fields.insert(DOCKER_KEY.to_string(), serde_json::to_value(docker)?);
    fields.insert(TAGS_KEY.to_string(), serde_json::to_value(tags)?);
    fields.insert(STREAM_KEY.to_string(), Value::String(stream.to_string()));
    if marathon.is_empty() {
        fields.retain(|key, _| key != MARATHON_KEY);
    } else {
        fields.insert(MARATHON_KEY.to_string(), serde_json::to_value(marathon)?);
    }

    Ok(OutboundRecord::Merged(fields))
}

/// Serializes `record` and terminates it with [`FRAME_DELIMITER`].
pub fn encode(record: &OutboundRecord<'_>) -> Result<Vec<u8>, ForwardError> {
    let mut frame = serde_json::to_vec(record)?;
    frame.push(FRAME_DELIMITER);
    Ok(frame)
}
