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

//! Exception (catch) blocks, kept sorted by catch start.

use log::{debug, error};
use serde_json::{json, Value};

use crate::errors::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionBlock {
    try_start: u64,
    try_size: u64,
    catch_start: u64,
    /// Zero for a single-point block.
    catch_size: u64,
}

impl ExceptionBlock {
    pub fn new(try_start: u64, try_size: u64, catch_start: u64, catch_size: u64) -> Self {
        Self {
            try_start,
            try_size,
            catch_start,
            catch_size,
        }
    }

    /// A block only described by its handler range.
    pub fn catch_only(catch_start: u64, catch_size: u64) -> Self {
        Self::new(0, 0, catch_start, catch_size)
    }

    pub fn try_start(&self) -> u64 {
        self.try_start
    }
    pub fn try_size(&self) -> u64 {
        self.try_size
    }
    pub fn catch_start(&self) -> u64 {
        self.catch_start
    }
    pub fn catch_size(&self) -> u64 {
        self.catch_size
    }

    /// Whether `addr` lies in the protected (try) range.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.try_start && addr - self.try_start < self.try_size
    }

    /// Whether the query range `[addr, addr + size)` touches the handler. A zero-width
    /// query only hits a block starting exactly at `addr`.
    fn catch_matches(&self, addr: u64, size: u64) -> bool {
        if size == 0 {
            return self.catch_start == addr;
        }
        let query_end = addr.saturating_add(size);
        if self.catch_size == 0 {
            return self.catch_start >= addr && self.catch_start < query_end;
        }
        let catch_end = self.catch_start.saturating_add(self.catch_size);
        self.catch_start < query_end && addr < catch_end
    }

    pub fn to_json(&self) -> Value {
        json!({
            "try_start": format!("0x{:x}", self.try_start),
            "try_size": format!("0x{:x}", self.try_size),
            "catch_start": format!("0x{:x}", self.catch_start),
            "catch_size": format!("0x{:x}", self.catch_size),
        })
    }
}

/// Blocks are appended during load and sorted once by `finalize`. Catch-block
/// queries refuse to run on an unsorted table.
#[derive(Default)]
pub struct ExceptionTable {
    blocks: Vec<ExceptionBlock>,
    sorted: bool,
}

impl ExceptionTable {
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            // Vacuously sorted.
            sorted: true,
        }
    }

    pub fn push(&mut self, block: ExceptionBlock) {
        self.blocks.push(block);
        self.sorted = false;
    }

    pub fn finalize(&mut self) {
        if !self.sorted {
            self.blocks.sort_by_key(|b| b.catch_start);
            debug!("Sorted exception table: {} blocks", self.blocks.len());
            self.sorted = true;
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn blocks(&self) -> &[ExceptionBlock] {
        &self.blocks
    }

    /// First block, in table order, whose try range contains `addr`.
    pub fn find_containing(&self, addr: u64) -> Option<&ExceptionBlock> {
        self.blocks.iter().find(|b| b.contains(addr))
    }

    /// Binary search for a block whose handler overlaps `[addr, addr + size)`.
    ///
    /// The probe index is tracked between rounds; once it repeats the search has
    /// stopped narrowing and reports a miss.
    pub fn find_catch_block(&self, addr: u64, size: u64) -> Result<&ExceptionBlock, LookupError> {
        if !self.sorted {
            error!("Catch block query before the exception table was finalized");
            return Err(LookupError::IndexNotBuilt);
        }

        let mut lo = 0;
        let mut hi = self.blocks.len();
        let mut last_probe = None;
        while lo < hi {
            let probe = lo + (hi - lo) / 2;
            if last_probe == Some(probe) {
                break;
            }
            last_probe = Some(probe);

            let block = &self.blocks[probe];
            if block.catch_matches(addr, size) {
                return Ok(block);
            }
            if addr < block.catch_start {
                hi = probe;
            } else if addr > block.catch_start {
                lo = probe;
            } else {
                break;
            }
        }
        Err(LookupError::NoSuchException)
    }
}
