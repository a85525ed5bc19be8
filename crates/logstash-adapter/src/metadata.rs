// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tag and scheduler metadata extraction from container environments.
//!
//! Two families of variables are recognized:
//!
//! - `LOGSTASH_TAGS=a,b,c` contributes the tags `a`, `b` and `c` verbatim.
//! - `MARATHON_APP_*` variables injected by the Marathon scheduler fill the
//!   `marathon` object; every `MARATHON_APP_LABEL_<K>=<V>` also contributes the
//!   tag `<K>_<V>`.
//!
//! Anything else is ignored. Nothing in here fails: malformed entries are skipped.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

#[cfg(test)]
thread_local! {
    static SCANS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of environment scans run on the current thread.
#[cfg(test)]
pub(crate) fn scan_count() -> usize {
    SCANS.with(std::cell::Cell::get)
}

const LOGSTASH_TAGS_PREFIX: &str = "LOGSTASH_TAGS=";
const MARATHON_LABEL_PREFIX: &str = "MARATHON_APP_LABEL_";
const MARATHON_CPUS_PREFIX: &str = "MARATHON_APP_RESOURCE_CPUS=";
const MARATHON_MEM_PREFIX: &str = "MARATHON_APP_RESOURCE_MEM=";
const MARATHON_DISK_PREFIX: &str = "MARATHON_APP_RESOURCE_DISK=";
const MARATHON_ID_PREFIX: &str = "MARATHON_APP_ID=";
const MARATHON_VERSION_PREFIX: &str = "MARATHON_APP_VERSION=";
const MARATHON_IMAGE_PREFIX: &str = "MARATHON_APP_DOCKER_IMAGE=";

/// Ordered tags of a container. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, tag: String) {
        self.0.push(tag);
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Tags(tags)
    }
}

impl<const N: usize> From<[&str; N]> for Tags {
    fn from(tags: [&str; N]) -> Self {
        Tags(tags.iter().map(|t| (*t).to_string()).collect())
    }
}

/// The `marathon` object of an outbound record. Unset facets are left out of the JSON.
///
/// `image` is informational only: it is never serialized and does not count as a facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip)]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl SchedulerMetadata {
    /// True when no facet is set and the `marathon` key should be omitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.id.is_none()
            && self.resources.is_empty()
            && self.labels.is_empty()
    }
}

/// Result of a single pass over a container environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerMetadata {
    pub tags: Tags,
    pub scheduler: SchedulerMetadata,
}

/// Scans `env` once, collecting tags and scheduler metadata in scan order.
#[must_use]
pub fn extract<S: AsRef<str>>(env: &[S]) -> ContainerMetadata {
    #[cfg(test)]
    SCANS.with(|scans| scans.set(scans.get() + 1));

    let mut metadata = ContainerMetadata::default();

    for entry in env {
        let entry = entry.as_ref();

        if let Some(value) = entry.strip_prefix(LOGSTASH_TAGS_PREFIX) {
            for tag in value.split(',') {
                metadata.tags.push(tag.to_string());
            }
        } else if let Some(label) = entry.strip_prefix(MARATHON_LABEL_PREFIX) {
            match label.split_once('=') {
                Some((key, value)) => {
                    metadata.tags.push(format!("{key}_{value}"));
                    metadata
                        .scheduler
                        .labels
                        .insert(key.to_string(), value.to_string());
                }
                None => trace!("Ignoring label without a value: {}", entry),
            }
        } else if let Some(value) = entry.strip_prefix(MARATHON_CPUS_PREFIX) {
            insert_resource(&mut metadata.scheduler, "cpus", value);
        } else if let Some(value) = entry.strip_prefix(MARATHON_MEM_PREFIX) {
            insert_resource(&mut metadata.scheduler, "mem", value);
        } else if let Some(value) = entry.strip_prefix(MARATHON_DISK_PREFIX) {
            insert_resource(&mut metadata.scheduler, "disk", value);
        } else if let Some(value) = entry.strip_prefix(MARATHON_ID_PREFIX) {
            metadata.scheduler.id = Some(value.to_string());
        } else if let Some(value) = entry.strip_prefix(MARATHON_VERSION_PREFIX) {
            metadata.scheduler.version = Some(value.to_string());
        } else if let Some(value) = entry.strip_prefix(MARATHON_IMAGE_PREFIX) {
            metadata.scheduler.image = Some(value.to_string());
        }
    }

    metadata
}

fn insert_resource(scheduler: &mut SchedulerMetadata, name: &str, value: &str) {
    scheduler
        .resources
        .insert(name.to_string(), value.to_string());
}
