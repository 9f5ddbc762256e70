//! Object (sprite) table conversion
//!
//! There are too many arcade object tiles (1024) and selectable object palettes (32) to assign
//! target resources statically, so each frame only the tiles and palettes that live objects
//! actually use are copied over. Each arcade slot gets its own 4-tile staging area, so tile
//! memory never runs out; palettes are compacted into the 15 usable target object palettes on a
//! first-come-first-served basis and anything past that falls back to palette 0.


use crate::colors::{ARCADE_PALETTE_LEN, ColorLut};
use crate::memory::{
    ACTIVE_TILE_H, ARCADE_OBJECT_SLOTS, BORDER_TILE_H, BORDER_TILE_W, COLORS_PER_PALETTE,
    OBJECT_PALETTE_BASE, TargetVideo, WORDS_PER_TILE,
};
use shim_common::frontend::BulkTransfer;
use shim_common::num::GetBit;

/// Tile number the arcade program parks unused objects on
pub const OBJ_CLEAR_TILE: u8 = 48;

/// Slots below this are never used by the arcade program
pub const FIRST_OBJECT_SLOT: usize = 16;

pub const SOURCE_OBJECT_PALETTES: usize = 32;
pub const COLORS_PER_SOURCE_PALETTE: usize = 4;

/// Target object palettes available for compaction; palette 0 means "unassigned"
pub const OBJECT_PALETTE_CAPACITY: u8 = 15;

// Double-size objects are 2x2 8x8 tiles
pub const TILES_PER_OBJECT: usize = 4;
pub const WORDS_PER_OBJECT: usize = TILES_PER_OBJECT * WORDS_PER_TILE;

/// Length of the object tile ROM, in 32-bit words: 256 objects of 4 tiles
pub const OBJECT_TILE_ROM_WORDS: usize = 256 * WORDS_PER_OBJECT;

const ACTIVE_HEIGHT_PX: u16 = ACTIVE_TILE_H * 8;

const SPRITE_ENABLE_BIT: u32 = 1 << 11;
const SPRITE_DOUBLE_SIZE_BIT: u32 = 1 << 28;

/// One decoded arcade object attribute word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectEntry {
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
    pub palette: u8,
    pub tile: u8,
    pub x: u8,
    pub y: u8,
}

impl ObjectEntry {
    #[inline]
    #[must_use]
    pub fn from_word(word: u32) -> Self {
        Self {
            horizontal_flip: word.bit(31),
            vertical_flip: word.bit(30),
            palette: word.bits(24..=28) as u8,
            tile: word.bits(16..=23) as u8,
            x: word.bits(8..=15) as u8,
            y: word.bits(0..=7) as u8,
        }
    }

    #[must_use]
    pub fn to_word(self) -> u32 {
        (u32::from(self.horizontal_flip) << 31)
            | (u32::from(self.vertical_flip) << 30)
            | (u32::from(self.palette & 0x1F) << 24)
            | (u32::from(self.tile) << 16)
            | (u32::from(self.x) << 8)
            | u32::from(self.y)
    }

    /// Horizontal position in arcade screen space.
    #[inline]
    #[must_use]
    pub fn screen_x(self) -> u8 {
        self.x.wrapping_add(8)
    }

    /// Vertical position in arcade screen space. The hardware counts y upwards from a point
    /// 16 lines below the bottom of the display.
    #[inline]
    #[must_use]
    pub fn screen_y(self) -> u8 {
        (!self.y).wrapping_sub(16)
    }

    /// There is no enable bit, so an object is live if it isn't parked on the clear tile and it is
    /// inside the active display band.
    #[inline]
    #[must_use]
    pub fn is_live(self) -> bool {
        self.tile != OBJ_CLEAR_TILE && u16::from(self.screen_y()) < ACTIVE_HEIGHT_PX
    }
}

/// A target sprite as written to the two sprite attribute tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSprite {
    pub first_tile: u16,
    pub palette: u8,
    pub x: u16,
    pub y: u16,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
}

impl TargetSprite {
    #[must_use]
    pub fn new(slot: usize, entry: ObjectEntry, palette: u8) -> Self {
        Self {
            first_tile: (slot * TILES_PER_OBJECT) as u16,
            palette,
            x: u16::from(entry.screen_x()) + BORDER_TILE_W * 8 - 8,
            y: u16::from(entry.screen_y()) + BORDER_TILE_H * 8,
            horizontal_flip: entry.horizontal_flip,
            vertical_flip: entry.vertical_flip,
        }
    }

    #[must_use]
    pub fn word_a(self) -> u32 {
        (u32::from(self.palette & 0x0F) << 12) | SPRITE_ENABLE_BIT | u32::from(self.first_tile)
    }

    #[must_use]
    pub fn word_b(self) -> u32 {
        SPRITE_DOUBLE_SIZE_BIT
            | (u32::from(self.vertical_flip) << 27)
            | (u32::from(self.horizontal_flip) << 26)
            | (u32::from(self.y) << 12)
            | u32::from(self.x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteSlot {
    /// Already assigned earlier this frame
    Resident(u8),
    /// Assigned by this lookup; the caller must upload the colors
    Assigned(u8),
    /// No target palettes left
    Exhausted,
}

/// Per-frame mapping from arcade object palettes to target object palettes.
#[derive(Debug, Clone, Default)]
pub struct PaletteCompaction {
    slots: [u8; SOURCE_OBJECT_PALETTES],
    assigned: u8,
}

impl PaletteCompaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, source_palette: u8) -> PaletteSlot {
        let source = usize::from(source_palette) % SOURCE_OBJECT_PALETTES;
        match self.slots[source] {
            0 if self.assigned < OBJECT_PALETTE_CAPACITY => {
                self.assigned += 1;
                self.slots[source] = self.assigned;
                PaletteSlot::Assigned(self.assigned)
            }
            0 => PaletteSlot::Exhausted,
            slot => PaletteSlot::Resident(slot),
        }
    }

    #[must_use]
    pub fn assigned(&self) -> u8 {
        self.assigned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectStats {
    pub live_objects: u8,
    pub palettes_assigned: u8,
    /// Live objects drawn with palette 0 because the target palettes ran out
    pub palette_fallbacks: u8,
}

fn upload_palette(
    source_palette: u8,
    target_slot: u8,
    arcade_palette: &[u16; ARCADE_PALETTE_LEN],
    lut: &ColorLut,
    video: &mut TargetVideo,
) {
    let src_start = usize::from(source_palette) * COLORS_PER_SOURCE_PALETTE;
    let dst_start = OBJECT_PALETTE_BASE + usize::from(target_slot) * COLORS_PER_PALETTE;

    for j in 0..COLORS_PER_SOURCE_PALETTE {
        video.palette[dst_start + j] = lut.get(arcade_palette[src_start + j]);
    }
}

/// Convert the arcade object table into the target sprite tables for this frame.
///
/// For every live object this stages the object's 4 tiles into the slot's private tile area,
/// resolves its palette (uploading newly used palettes) and writes both sprite attribute words.
/// Dead objects only have their enable word cleared.
pub fn convert_objects<D: BulkTransfer>(
    objects: &[u32; ARCADE_OBJECT_SLOTS],
    arcade_palette: &[u16; ARCADE_PALETTE_LEN],
    lut: &ColorLut,
    object_tiles: &[u32],
    dma: &mut D,
    video: &mut TargetVideo,
) -> ObjectStats {
    let mut compaction = PaletteCompaction::new();
    let mut stats = ObjectStats::default();

    for (slot, &word) in objects.iter().enumerate().skip(FIRST_OBJECT_SLOT) {
        let entry = ObjectEntry::from_word(word);

        if !entry.is_live() {
            video.sprites_a[slot] = 0;
            continue;
        }

        stats.live_objects += 1;

        // Objects may share a source tile; each slot gets its own copy regardless
        let src_start = usize::from(entry.tile) * WORDS_PER_OBJECT;
        let dst_start = slot * WORDS_PER_OBJECT;
        match object_tiles.get(src_start..src_start + WORDS_PER_OBJECT) {
            Some(src) => {
                dma.copy_words(&mut video.tileset[dst_start..dst_start + WORDS_PER_OBJECT], src);
            }
            None => {
                log::debug!("Object tile {} is outside the object tile ROM", entry.tile);
            }
        }

        let palette = match compaction.resolve(entry.palette) {
            PaletteSlot::Resident(target_slot) => target_slot,
            PaletteSlot::Assigned(target_slot) => {
                upload_palette(entry.palette, target_slot, arcade_palette, lut, video);
                target_slot
            }
            PaletteSlot::Exhausted => {
                stats.palette_fallbacks += 1;
                0
            }
        };

        let sprite = TargetSprite::new(slot, entry, palette);
        video.sprites_a[slot] = sprite.word_a();
        video.sprites_b[slot] = sprite.word_b();
    }

    stats.palettes_assigned = compaction.assigned();

    if stats.palette_fallbacks != 0 {
        log::debug!(
            "Object palettes exhausted; {} of {} live objects fell back to palette 0",
            stats.palette_fallbacks,
            stats.live_objects
        );
    }

    stats
}
