// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registry of key images that have already produced a verified signature.

use std::collections::HashSet;
use std::sync::Mutex;

use super::keys::KeyImage;

/// Set of spent key images.
///
/// Entries are only ever added. `claim` is the single check-and-insert
/// step; two concurrent claims of the same image must see exactly one
/// `true`.
pub trait KeyImageRegistry: Send + Sync {
    /// Mark `key_image` as used. Returns `true` if it was not used before.
    fn claim(&self, key_image: &KeyImage) -> bool;

    fn contains(&self, key_image: &KeyImage) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local registry guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemoryKeyImageSet {
    used: Mutex<HashSet<KeyImage>>,
}

impl InMemoryKeyImageSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyImageRegistry for InMemoryKeyImageSet {
    fn claim(&self, key_image: &KeyImage) -> bool {
        match self.used.lock() {
            Ok(mut used) => used.insert(*key_image),
            Err(_) => {
                // A poisoned set can no longer prove freshness.
                tracing::error!(key_image = %key_image, "Key image set lock poisoned");
                false
            }
        }
    }

    fn contains(&self, key_image: &KeyImage) -> bool {
        match self.used.lock() {
            Ok(used) => used.contains(key_image),
            Err(_) => true,
        }
    }

    fn len(&self) -> usize {
        match self.used.lock() {
            Ok(used) => used.len(),
            Err(poisoned) => {
                // Entries are insert-only, so the poisoned set is still consistent.
                tracing::error!("Key image set lock poisoned");
                poisoned.into_inner().len()
            }
        }
    }
}
