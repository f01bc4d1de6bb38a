//! Merged-region resolution
//!
//! A merged region displays a single value stored in its top-left cell (the
//! anchor). [`MergeMap`] is built once per loaded template from the sheet's
//! declared merged ranges, so resolving a write target is a table lookup
//! rather than an inspection of the cell at write time.

use ahash::AHashMap;

use crate::cell::{CellAddress, CellRange};
use crate::error::{Error, Result};

/// Regions with more cells than this are kept out of the index and checked
/// by containment instead (e.g. whole-column merges).
const MAX_INDEXED_CELLS: u64 = 65_536;

/// Lookup from every merged cell to its region's anchor
#[derive(Debug, Clone, Default)]
pub struct MergeMap {
    regions: Vec<CellRange>,
    anchors: AHashMap<CellAddress, CellAddress>,
    unindexed: Vec<CellRange>,
}

impl MergeMap {
    /// Build the map from a sheet's merged ranges.
    ///
    /// Single-cell ranges are ignored. Overlapping ranges are rejected, as
    /// spreadsheet applications refuse to open such files.
    pub fn new(regions: &[CellRange]) -> Result<Self> {
        let mut map = MergeMap::default();

        for region in regions.iter().filter(|r| r.cell_count() > 1) {
            if let Some(existing) = map.regions.iter().find(|r| r.overlaps(region)) {
                return Err(Error::MergedCellConflict(
                    existing.to_a1_string(),
                    region.to_a1_string(),
                ));
            }

            if region.cell_count() > MAX_INDEXED_CELLS {
                map.unindexed.push(*region);
            } else {
                // The anchor resolves to itself, so only the covered cells go in.
                for addr in region.cells().skip(1) {
                    map.anchors.insert(addr, region.start);
                }
            }
            map.regions.push(*region);
        }

        Ok(map)
    }

    /// Address that actually receives a write aimed at `addr`
    pub fn resolve(&self, addr: CellAddress) -> CellAddress {
        if let Some(anchor) = self.anchors.get(&addr) {
            return *anchor;
        }
        self.unindexed
            .iter()
            .find(|r| r.contains(&addr))
            .map(|r| r.start)
            .unwrap_or(addr)
    }

    /// The merged region containing `addr`, if any
    pub fn region_of(&self, addr: CellAddress) -> Option<&CellRange> {
        self.regions.iter().find(|r| r.contains(&addr))
    }

    /// All merged regions, in declaration order
    pub fn regions(&self) -> &[CellRange] {
        &self.regions
    }

    /// Number of merged regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the sheet has no merged regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
