//! Playfield (background tile map) write conversion
//!
//! The arcade playfield is 32x32 cells of 16-bit words, each selecting one of 512 tiles and one
//! of 64 4-color palette groups. The target has 16 16-color palettes, so every ordinary tile is
//! stored four times in tile memory, each copy pre-shifted to select a different 4-color subset
//! of a 16-color palette. That needs more tiles than one map can address (1024), so two maps are
//! layered over the same area with different tile bases, and each cell is owned by exactly one of
//! them while the other shows its clear tile.
//!
//! The title logo tiles are the exception: there are many of them and they always use the same
//! palette subset, so they are stored once each, packed right after the last quadrupled tile.

use crate::memory::{BORDER_TILE_H, BORDER_TILE_W};
use bincode::{Decode, Encode};
use shim_common::num::GetBit;

pub const PLAYFIELD_TILE_W: u16 = 32;
pub const PLAYFIELD_TILE_H: u16 = 32;

const PLAYFIELD_ADDRESS_MASK: u16 = 0x7FF;

pub const MAP_TILE_W: usize = 64;
pub const MAP_TILE_H: usize = 64;
pub const MAP_LEN: usize = MAP_TILE_W * MAP_TILE_H;

pub const MAP_A_CLEAR: u16 = 0;
pub const MAP_B_CLEAR: u16 = 128;

/// Number of tiles addressable through a single map entry
pub const MAP_TILE_LIMIT: u16 = 1024;

/// First arcade tile of the title logo; tiles from here on are stored only once
pub const LOGO_START_TILE: u16 = 288;

/// A single arcade write into its playfield register range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayfieldWrite {
    pub address: u16,
    pub value: u16,
}

impl PlayfieldWrite {
    #[must_use]
    pub fn new(address: u16, value: u16) -> Self {
        Self { address, value }
    }

    /// Linear cell index, 0-1023. Cells are 16 bits wide.
    #[inline]
    #[must_use]
    pub fn cell(self) -> u16 {
        (self.address & PLAYFIELD_ADDRESS_MASK) >> 1
    }

    /// 9-bit tile number: bits 0-7 of the value plus bit 15 as bit 8.
    #[inline]
    #[must_use]
    pub fn source_tile(self) -> u16 {
        (u16::from(self.value.bit(15)) << 8) | (self.value & 0xFF)
    }

    /// 6-bit palette group from bits 8-13.
    #[inline]
    #[must_use]
    pub fn source_palette(self) -> u16 {
        self.value.bits(8..=13)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum MapOwner {
    A,
    B,
}

/// The result of converting one playfield write: the cell's map index, the map that owns it and
/// the entry to store there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapCellWrite {
    pub index: usize,
    pub owner: MapOwner,
    pub entry: u16,
}

impl MapCellWrite {
    #[must_use]
    pub fn map_a_value(self) -> u16 {
        match self.owner {
            MapOwner::A => self.entry,
            MapOwner::B => MAP_A_CLEAR,
        }
    }

    #[must_use]
    pub fn map_b_value(self) -> u16 {
        match self.owner {
            MapOwner::A => MAP_B_CLEAR,
            MapOwner::B => self.entry,
        }
    }
}

/// Map a linear arcade cell index to a target map index.
///
/// The arcade addresses the playfield column-major while the target is row-major, and the
/// arcade's columns are one position out of step with the target's, so the column rotates by
/// one. The result is offset by the border so the playfield is centered on screen.
#[inline]
#[must_use]
pub fn destination_index(cell: u16) -> usize {
    let cell = cell % (PLAYFIELD_TILE_W * PLAYFIELD_TILE_H);

    let row = cell % PLAYFIELD_TILE_W;
    let column = (cell / PLAYFIELD_TILE_W + 1) % PLAYFIELD_TILE_H;

    usize::from(row + BORDER_TILE_H) * MAP_TILE_W + usize::from(column + BORDER_TILE_W)
}

/// Map an arcade tile number and palette group to the stored tile copy.
#[inline]
#[must_use]
pub fn remap_tile(tile: u16, palette_group: u16) -> u16 {
    if tile < LOGO_START_TILE {
        // Low 2 bits of the palette group select one of the 4 shifted copies
        tile * 4 + (palette_group & 3)
    } else {
        LOGO_START_TILE * 4 + (tile - LOGO_START_TILE)
    }
}

#[must_use]
pub fn convert_write(write: PlayfieldWrite) -> MapCellWrite {
    let palette_group = write.source_palette();
    let tile = remap_tile(write.source_tile(), palette_group);

    // High 4 bits of the palette group select the 16-color palette
    let palette = palette_group >> 2;
    let entry = (palette << 12) | (tile & 0x3FF);

    let owner = if tile < MAP_TILE_LIMIT { MapOwner::A } else { MapOwner::B };

    MapCellWrite { index: destination_index(write.cell()), owner, entry }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct TileMaps {
    pub(crate) map_a: Box<[u16]>,
    pub(crate) map_b: Box<[u16]>,
}

impl TileMaps {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map_a: vec![MAP_A_CLEAR; MAP_LEN].into_boxed_slice(),
            map_b: vec![MAP_B_CLEAR; MAP_LEN].into_boxed_slice(),
        }
    }

    pub fn apply(&mut self, write: MapCellWrite) {
        self.map_a[write.index] = write.map_a_value();
        self.map_b[write.index] = write.map_b_value();
    }

    /// Convert and apply a playfield write.
    pub fn write(&mut self, address: u16, value: u16) {
        let write = convert_write(PlayfieldWrite::new(address, value));

        log::trace!(
            "Playfield write {address:04X}={value:04X} -> map {:?} [{}] = {:04X}",
            write.owner,
            write.index,
            write.entry
        );

        self.apply(write);
    }

    #[must_use]
    pub fn map_a(&self) -> &[u16] {
        &self.map_a
    }

    #[must_use]
    pub fn map_b(&self) -> &[u16] {
        &self.map_b
    }

    /// The (map A, map B) entries at `index`.
    #[must_use]
    pub fn cell(&self, index: usize) -> (u16, u16) {
        (self.map_a[index], self.map_b[index])
    }
}

impl Default for TileMaps {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DisplayRegisters, TargetVideo};
    use test_log::test;

    fn value(tile: u16, palette_group: u16) -> u16 {
        ((tile & 0x100) << 7) | ((palette_group & 0x3F) << 8) | (tile & 0xFF)
    }

    #[test]
    fn decode_value_fields() {
        let write = PlayfieldWrite::new(0, 0x8000 | 0x3F00 | 0x42);
        assert_eq!(write.source_tile(), 0x142);
        assert_eq!(write.source_palette(), 0x3F);

        // Bit 14 is not part of either field
        let write = PlayfieldWrite::new(0, 0x4000 | 0x0105);
        assert_eq!(write.source_tile(), 0x05);
        assert_eq!(write.source_palette(), 0x01);
    }

    #[test]
    fn address_zero() {
        let write = convert_write(PlayfieldWrite::new(0, value(5, 9)));

        // Cell 0 is row 0, column 0 rotated to column 1
        let expected_index = usize::from(BORDER_TILE_H) * MAP_TILE_W + 1 + usize::from(BORDER_TILE_W);
        assert_eq!(write.index, expected_index);
        assert_eq!(write.owner, MapOwner::A);
        assert_eq!(write.entry, (2 << 12) | (5 * 4 + 1));
    }

    #[test]
    fn transposes_and_rotates() {
        // Cell 33: column 1, row 1 in arcade order
        assert_eq!(destination_index(33), (1 + 1) * MAP_TILE_W + (2 + 4));
        // Last column wraps to column 0
        assert_eq!(destination_index(31 * 32 + 7), (7 + 1) * MAP_TILE_W + 4);
        // Address is halved and masked to the playfield
        let write = convert_write(PlayfieldWrite::new(0x0800 | 66, value(1, 0)));
        assert_eq!(write.index, destination_index(33));
    }

    #[test]
    fn every_cell_lands_inside_active_area() {
        let mut seen = vec![false; MAP_LEN];
        for cell in 0..1024 {
            let index = destination_index(cell);
            let (row, column) = (index / MAP_TILE_W, index % MAP_TILE_W);
            assert!((1..33).contains(&row), "row {row} for cell {cell}");
            assert!((4..36).contains(&column), "column {column} for cell {cell}");
            assert!(!seen[index], "cell {cell} collides");
            seen[index] = true;
        }
    }

    #[test]
    fn logo_tiles_are_packed() {
        assert_eq!(remap_tile(LOGO_START_TILE - 1, 3), 1151);
        assert_eq!(remap_tile(LOGO_START_TILE, 0), 1152);
        assert_eq!(remap_tile(LOGO_START_TILE, 3), 1152);
        assert_eq!(remap_tile(511, 2), 1152 + 511 - 288);
    }

    #[test]
    fn map_selection_by_tile_limit() {
        // 255 * 4 + 3 = 1023, last tile map A can address
        let write = convert_write(PlayfieldWrite::new(0, value(255, 3)));
        assert_eq!(write.owner, MapOwner::A);
        assert_eq!(write.entry, 1023);

        let write = convert_write(PlayfieldWrite::new(0, value(256, 0)));
        assert_eq!(write.owner, MapOwner::B);
        assert_eq!(write.entry, 0);

        let write = convert_write(PlayfieldWrite::new(0, value(300, 7)));
        assert_eq!(write.owner, MapOwner::B);
        assert_eq!(write.entry, (1 << 12) | ((1152 + 12) & 0x3FF));
    }

    #[test]
    fn both_maps_resolve_to_the_same_stored_tile() {
        let mut video = TargetVideo::new();
        video.registers = DisplayRegisters::converted_display();

        for (tile, palette_group) in [(0, 0), (17, 6), (255, 3), (256, 1), (287, 2), (300, 0), (511, 63)] {
            let write = convert_write(PlayfieldWrite::new(0, value(tile, palette_group)));
            let stored = 512 + usize::from(remap_tile(tile, palette_group));
            assert_eq!(video.tileset_index(write.owner, write.entry), stored, "tile {tile}");
        }
    }

    #[test]
    fn repeated_write_is_idempotent() {
        let mut maps = TileMaps::new();
        maps.write(0x0124, value(300, 21));
        let once = maps.clone();
        maps.write(0x0124, value(300, 21));

        assert_eq!(once.map_a(), maps.map_a());
        assert_eq!(once.map_b(), maps.map_b());
    }

    #[test]
    fn cells_are_owned_by_one_map() {
        let mut maps = TileMaps::new();

        // Move the same cells back and forth between the two maps
        let mut owners = vec![None; MAP_LEN];
        for step in 0..4096_u32 {
            let address = ((step * 37) % 2048) as u16;
            let tile = ((step * 131) % 512) as u16;
            let palette_group = ((step * 7) % 64) as u16;

            let write = convert_write(PlayfieldWrite::new(address, value(tile, palette_group)));
            maps.apply(write);
            owners[write.index] = Some(write);
        }

        for (index, owner) in owners.into_iter().enumerate() {
            let (a, b) = maps.cell(index);
            match owner {
                None => assert_eq!((a, b), (MAP_A_CLEAR, MAP_B_CLEAR)),
                Some(write) => match write.owner {
                    MapOwner::A => assert_eq!((a, b), (write.entry, MAP_B_CLEAR)),
                    MapOwner::B => assert_eq!((a, b), (MAP_A_CLEAR, write.entry)),
                },
            }
        }
    }
}
