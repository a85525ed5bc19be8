// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-container metadata cache.
//!
//! The environment of a container is scanned on its first log line and the
//! result is reused for every following line. Entries are never evicted or
//! refreshed: a container's environment is fixed for its lifetime.

use crate::metadata::ContainerMetadata;
use fnv::FnvBuildHasher;
use hashbrown::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Memoizes extracted metadata by container id.
pub trait MetadataCache: Send + Sync {
    /// Returns the stored metadata for `container_id`, running `compute` only on a miss.
    fn lookup_or_compute(
        &self,
        container_id: &str,
        compute: &mut dyn FnMut() -> ContainerMetadata,
    ) -> Arc<ContainerMetadata>;

    /// Number of containers with stored metadata.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`MetadataCache`] owned by a single forwarder.
#[derive(Debug, Default)]
pub struct ContainerMetadataCache {
    entries: RwLock<HashMap<String, Arc<ContainerMetadata>, FnvBuildHasher>>,
}

impl ContainerMetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::with_hasher(FnvBuildHasher::default())),
        }
    }
}

impl MetadataCache for ContainerMetadataCache {
    fn lookup_or_compute(
        &self,
        container_id: &str,
        compute: &mut dyn FnMut() -> ContainerMetadata,
    ) -> Arc<ContainerMetadata> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(metadata) = entries.get(container_id) {
                return Arc::clone(metadata);
            }
        }

        // Computed outside the lock. Two racing misses for one id produce equal metadata.
        let metadata = Arc::new(compute());
        trace!(
            "Caching {} tags for container {}",
            metadata.tags.len(),
            container_id
        );
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(container_id.to_string(), Arc::clone(&metadata));
        metadata
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
