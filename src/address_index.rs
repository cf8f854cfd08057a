// Copyright (c) 2026 MCU-Debug Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Address-ordered lookup over a growable collection.
//!
//! Entries are appended in any order. The sorted view is built on the first query
//! after an append and reused until the next append, so a batch of inserts costs one
//! sort. Appending needs `&mut self`, which is what keeps readers of a built view from
//! racing a writer; the view itself lives in a `OnceLock` so any number of `&self`
//! readers can share it.

use log::debug;
use std::sync::OnceLock;

/// One indexed entity: a start address, an extent, and a handle back into the arena
/// that owns the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressEntry<H> {
    pub start: u64,
    pub size: u64,
    pub handle: H,
}

impl<H> AddressEntry<H> {
    /// Half-open containment: `start + size` itself is outside.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr - self.start < self.size
    }
}

pub struct AddressIndex<H> {
    label: &'static str,
    // Insertion order, never reordered.
    entries: Vec<AddressEntry<H>>,
    // Empty means dirty.
    sorted: OnceLock<Vec<AddressEntry<H>>>,
}

impl<H: Copy> AddressIndex<H> {
    /// `label` only shows up in log output.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Vec::new(),
            sorted: OnceLock::new(),
        }
    }

    pub fn insert(&mut self, start: u64, size: u64, handle: H) {
        self.entries.push(AddressEntry {
            start,
            size,
            handle,
        });
        self.sorted.take();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.entries.iter().map(|e| e.handle)
    }

    /// True when the sorted view is current, i.e. no append happened since the last query.
    pub fn is_built(&self) -> bool {
        self.sorted.get().is_some()
    }

    /// The entries ordered by start address. Entries sharing a start address keep
    /// their insertion order.
    pub fn sorted(&self) -> &[AddressEntry<H>] {
        self.sorted.get_or_init(|| {
            let mut view = self.entries.clone();
            view.sort_by_key(|e| e.start);
            debug!("Sorted {} index: {} entries", self.label, view.len());
            view
        })
    }

    /// Entry starting exactly at `addr`. With several, the earliest inserted wins.
    pub fn find_exact(&self, addr: u64) -> Option<H> {
        let view = self.sorted();
        let idx = view.partition_point(|e| e.start < addr);
        view.get(idx)
            .filter(|e| e.start == addr)
            .map(|e| e.handle)
    }

    /// Entry with the greatest start address not exceeding `addr`. Extents are not
    /// consulted, so `addr` may lie past the end of the returned entity.
    pub fn find_nearest_at_or_below(&self, addr: u64) -> Option<H> {
        let view = self.sorted();
        let above = view.partition_point(|e| e.start <= addr);
        if above == 0 {
            return None;
        }
        // Step back to the first entry sharing that start.
        let start = view[above - 1].start;
        let first = view.partition_point(|e| e.start < start);
        Some(view[first].handle)
    }

    /// Entry whose `[start, start + size)` contains `addr`. Only meaningful when the
    /// intervals do not overlap; overlapping sets need a linear scan instead.
    pub fn find_enclosing(&self, addr: u64) -> Option<H> {
        let view = self.sorted();
        let mut lo = 0;
        let mut hi = view.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = &view[mid];
            if entry.contains(addr) {
                return Some(entry.handle);
            }
            if addr < entry.start {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        None
    }

    /// Linear scan in insertion order for the first entry containing `addr`.
    pub fn scan_enclosing(&self, addr: u64) -> Option<H> {
        self.entries
            .iter()
            .find(|e| e.contains(addr))
            .map(|e| e.handle)
    }
}
