//! Arcade-side and target-side memory views
//!
//! The arcade program owns [`ArcadeMemory`]; the conversion routines only read it, apart from the
//! input latches and calibration block that the input step overwrites. [`TargetVideo`] is the
//! output side: palette RAM, tile memory, the sprite table, both tile maps and the display
//! configuration registers.

use crate::colors::ARCADE_PALETTE_LEN;
use crate::playfield::{MapOwner, TileMaps};
use bincode::{Decode, Encode};

pub const SCREEN_TILE_W: u16 = 40;
pub const SCREEN_TILE_H: u16 = 30;

pub const ACTIVE_TILE_W: u16 = 32;
pub const ACTIVE_TILE_H: u16 = 28;

pub const BORDER_TILE_W: u16 = (SCREEN_TILE_W - ACTIVE_TILE_W) / 2;
pub const BORDER_TILE_H: u16 = (SCREEN_TILE_H - ACTIVE_TILE_H) / 2;

pub const ARCADE_OBJECT_SLOTS: usize = 64;

// 8 KiB of arcade work RAM, as 16-bit words
pub const PROGRAM_RAM_WORDS: usize = 0x1000;

pub const ANALOG_CALIBRATION_ADDRESS: usize = 0x1684;
pub const ANALOG_CHANNELS: usize = 4;

const _: () = assert!((ANALOG_CALIBRATION_ADDRESS >> 1) + ANALOG_CHANNELS <= PROGRAM_RAM_WORDS);

// 4bpp 8x8 tiles
pub const WORDS_PER_TILE: usize = 8;
pub const TILESET_WORDS: usize = 0x4000;
pub const TILESET_TILES: usize = TILESET_WORDS / WORDS_PER_TILE;

// Playfield tiles live above the per-frame object staging area
pub const PLAYFIELD_TILE_BASE: usize = 512;

pub const TARGET_PALETTE_LEN: usize = 512;
pub const OBJECT_PALETTE_BASE: usize = 256;
pub const COLORS_PER_PALETTE: usize = 16;

pub const SPRITE_SLOTS: usize = 256;

#[derive(Debug, Clone)]
pub struct ArcadeMemory {
    /// Color table, one RGB332 color in the low byte of each entry
    pub palette: [u16; ARCADE_PALETTE_LEN],
    /// Packed object attribute words
    pub objects: [u32; ARCADE_OBJECT_SLOTS],
    pub program_ram: Box<[u16]>,
    /// Active-low digital switch latch
    pub digital_read: u16,
    /// Latch returned by the analog-to-digital converter
    pub analog_read: u16,
    /// Conversion start strobes, one per analog channel; non-zero means a conversion was requested
    pub analog_select: [u16; ANALOG_CHANNELS],
}

impl ArcadeMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            palette: [0; ARCADE_PALETTE_LEN],
            objects: [0; ARCADE_OBJECT_SLOTS],
            program_ram: vec![0; PROGRAM_RAM_WORDS].into_boxed_slice(),
            digital_read: 0xFF,
            analog_read: 0xFF7F,
            analog_select: [0; ANALOG_CHANNELS],
        }
    }
}

impl Default for ArcadeMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum ScreenMode {
    #[default]
    Off,
    Tile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct DisplayRegisters {
    pub screen_mode: ScreenMode,
    /// Bits 4-5 enable map layers 1 and 2
    pub map_set: u8,
    /// Bits 0-1: map A tile base in units of 512 tiles; bits 2-3: same for map B
    pub map_shift: u8,
    /// Bit 5 clips objects to the window
    pub window_mask: u8,
    pub window_left: u16,
    pub window_right: u16,
}

impl DisplayRegisters {
    /// Register values for the converted display: tile mode, both maps enabled, map A tiles at
    /// 512 and map B tiles at 1536, objects clipped to the arcade's active area.
    #[must_use]
    pub fn converted_display() -> Self {
        Self {
            screen_mode: ScreenMode::Tile,
            map_set: 0x30,
            map_shift: (3 << 2) | 1,
            window_mask: 0x20,
            window_left: BORDER_TILE_W * 8,
            window_right: (SCREEN_TILE_W - BORDER_TILE_W) * 8,
        }
    }

    #[must_use]
    pub fn map_a_tile_base(&self) -> usize {
        usize::from(self.map_shift & 3) * 512
    }

    #[must_use]
    pub fn map_b_tile_base(&self) -> usize {
        usize::from((self.map_shift >> 2) & 3) * 512
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct TargetVideo {
    pub palette: [u16; TARGET_PALETTE_LEN],
    pub tileset: Box<[u32]>,
    /// Sprite attribute word A: palette, enable, first tile
    pub sprites_a: [u32; SPRITE_SLOTS],
    /// Sprite attribute word B: size, flips, position
    pub sprites_b: [u32; SPRITE_SLOTS],
    pub maps: TileMaps,
    pub registers: DisplayRegisters,
}

impl TargetVideo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            palette: [0; TARGET_PALETTE_LEN],
            tileset: vec![0; TILESET_WORDS].into_boxed_slice(),
            sprites_a: [0; SPRITE_SLOTS],
            sprites_b: [0; SPRITE_SLOTS],
            maps: TileMaps::new(),
            registers: DisplayRegisters::default(),
        }
    }

    /// Resolve a map entry's tile number to an index into the tileset, applying the map shift.
    #[must_use]
    pub fn tileset_index(&self, map: MapOwner, entry: u16) -> usize {
        let base = match map {
            MapOwner::A => self.registers.map_a_tile_base(),
            MapOwner::B => self.registers.map_b_tile_base(),
        };
        base + usize::from(entry & 0x3FF)
    }

    #[must_use]
    pub fn tile_words(&self, tile: usize) -> &[u32] {
        let start = (tile % TILESET_TILES) * WORDS_PER_TILE;
        &self.tileset[start..start + WORDS_PER_TILE]
    }
}

impl Default for TargetVideo {
    fn default() -> Self {
        Self::new()
    }
}
