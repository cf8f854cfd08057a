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

//! Memory regions (sections) and the enclosing-region index.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::address_index::AddressIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Code,
    Data,
    Other,
}

impl RegionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionKind::Code => "code",
            RegionKind::Data => "data",
            RegionKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryRegion {
    pub name: String,
    pub start: u64,
    pub size: u64,
    pub align: u64,
    pub kind: RegionKind,
}

impl MemoryRegion {
    pub fn new(name: String, start: u64, size: u64, align: u64, kind: RegionKind) -> Self {
        Self {
            name,
            start,
            size,
            align,
            kind,
        }
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr - self.start < self.size
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "kind": self.kind.as_str(),
            "start": format!("0x{:x}", self.start),
            "size": format!("0x{:x}", self.size),
            "align": format!("0x{:x}", self.align),
        })
    }
}

/// All regions of a table plus the code and data subsets.
///
/// When `may_overlap` is set (container formats that legitimately place several
/// loadable sections at address 0), enclosing queries scan code regions, then data
/// regions, then everything, in insertion order. Otherwise they binary search.
pub struct RegionIndex {
    may_overlap: bool,
    regions: Vec<MemoryRegion>,
    all: AddressIndex<RegionId>,
    code: AddressIndex<RegionId>,
    data: AddressIndex<RegionId>,
    by_entry: HashMap<u64, RegionId>,
}

impl RegionIndex {
    pub fn new(may_overlap: bool) -> Self {
        Self {
            may_overlap,
            regions: Vec::new(),
            all: AddressIndex::new("regions"),
            code: AddressIndex::new("code regions"),
            data: AddressIndex::new("data regions"),
            by_entry: HashMap::new(),
        }
    }

    pub fn may_overlap(&self) -> bool {
        self.may_overlap
    }

    pub fn insert(&mut self, region: MemoryRegion) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.all.insert(region.start, region.size, id);
        match region.kind {
            RegionKind::Code => self.code.insert(region.start, region.size, id),
            RegionKind::Data => self.data.insert(region.start, region.size, id),
            RegionKind::Other => {}
        }
        self.by_entry.entry(region.start).or_insert(id);
        self.regions.push(region);
        id
    }

    pub fn get(&self, id: RegionId) -> Option<&MemoryRegion> {
        self.regions.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Sort every sub-index now instead of on first query.
    pub fn build(&self) {
        self.all.sorted();
        self.code.sorted();
        self.data.sorted();
    }

    pub fn all(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.all.handles()
    }

    pub fn code_regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.code.handles()
    }

    pub fn data_regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.data.handles()
    }

    pub fn find_enclosing(&self, addr: u64) -> Option<RegionId> {
        if self.may_overlap {
            return self
                .code
                .scan_enclosing(addr)
                .or_else(|| self.data.scan_enclosing(addr))
                .or_else(|| self.all.scan_enclosing(addr));
        }
        self.all.find_enclosing(addr)
    }

    pub fn is_code(&self, addr: u64) -> bool {
        Self::encloses(&self.code, self.may_overlap, addr)
    }

    pub fn is_data(&self, addr: u64) -> bool {
        Self::encloses(&self.data, self.may_overlap, addr)
    }

    fn encloses(index: &AddressIndex<RegionId>, may_overlap: bool, addr: u64) -> bool {
        if may_overlap {
            index.scan_enclosing(addr).is_some()
        } else {
            index.find_enclosing(addr).is_some()
        }
    }

    /// First region, in insertion order, with this name.
    pub fn find_by_name(&self, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.name == name)
            .map(|idx| RegionId(idx as u32))
    }

    /// Region starting exactly at `addr`; the first inserted wins.
    pub fn find_by_entry(&self, addr: u64) -> Option<RegionId> {
        self.by_entry.get(&addr).copied()
    }
}
