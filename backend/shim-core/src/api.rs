//! Shim public interface: startup and the per-frame entry points

use crate::colors::{self, ColorLut};
use crate::input::{ArcadeInputs, InputState};
use crate::memory::{
    ArcadeMemory, DisplayRegisters, PLAYFIELD_TILE_BASE, TILESET_WORDS, TargetVideo,
    WORDS_PER_TILE,
};
use crate::objects::{self, OBJECT_TILE_ROM_WORDS, ObjectStats};
use crate::playfield::{MAP_A_CLEAR, MAP_B_CLEAR};
use shim_common::frontend::{BulkTransfer, HostInput};
use shim_config::ShimConfig;
use thiserror::Error;

const OBJECT_TILE_ROM_LEN: usize = OBJECT_TILE_ROM_WORDS * 4;
const PLAYFIELD_TILE_ROM_MAX_LEN: usize = (TILESET_WORDS - PLAYFIELD_TILE_BASE * WORDS_PER_TILE) * 4;

#[derive(Debug, Error)]
pub enum ShimLoadError {
    #[error("Invalid object tile ROM; expected at least {expected} bytes, was {actual} bytes")]
    ObjectTilesTooShort { expected: usize, actual: usize },
    #[error("Invalid playfield tile ROM; length must be a multiple of 4 bytes, was {actual} bytes")]
    PlayfieldTilesMisaligned { actual: usize },
    #[error("Invalid playfield tile ROM; at most {max} bytes fit in tile memory, was {actual} bytes")]
    PlayfieldTilesTooLong { max: usize, actual: usize },
}

/// Raw arcade graphics ROM contents, 4bpp 8x8 tiles in the target's tile format.
#[derive(Debug, Clone, Default)]
pub struct TileRoms {
    pub object_tiles: Vec<u8>,
    pub playfield_tiles: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub objects: ObjectStats,
    pub inputs: ArcadeInputs,
}

fn bytes_to_words(bytes: &[u8]) -> Box<[u32]> {
    bytes.chunks_exact(4).map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])).collect()
}

fn load_object_tiles(rom: &[u8]) -> Result<Box<[u32]>, ShimLoadError> {
    if rom.len() < OBJECT_TILE_ROM_LEN {
        return Err(ShimLoadError::ObjectTilesTooShort {
            expected: OBJECT_TILE_ROM_LEN,
            actual: rom.len(),
        });
    }

    if rom.len() > OBJECT_TILE_ROM_LEN {
        log::warn!(
            "Object tile ROM is {} bytes; ignoring everything past {OBJECT_TILE_ROM_LEN} bytes",
            rom.len()
        );
    }

    Ok(bytes_to_words(&rom[..OBJECT_TILE_ROM_LEN]))
}

fn load_playfield_tiles(rom: &[u8]) -> Result<Box<[u32]>, ShimLoadError> {
    if rom.len() % 4 != 0 {
        return Err(ShimLoadError::PlayfieldTilesMisaligned { actual: rom.len() });
    }

    if rom.len() > PLAYFIELD_TILE_ROM_MAX_LEN {
        return Err(ShimLoadError::PlayfieldTilesTooLong {
            max: PLAYFIELD_TILE_ROM_MAX_LEN,
            actual: rom.len(),
        });
    }

    Ok(bytes_to_words(rom))
}

/// The per-frame driver. Owns the target video memory and the persistent input state; the arcade
/// program's memory is passed in on every call.
#[derive(Debug, Clone)]
pub struct ShimCore {
    lut: &'static ColorLut,
    video: TargetVideo,
    object_tiles: Box<[u32]>,
    input: InputState,
    config: ShimConfig,
    frame_count: u64,
}

impl ShimCore {
    /// Validate the tile ROMs, configure the display and initialize target memory.
    ///
    /// # Errors
    ///
    /// Returns an error if either tile ROM has an invalid length.
    pub fn create<D: BulkTransfer>(
        roms: TileRoms,
        config: ShimConfig,
        dma: &mut D,
    ) -> Result<Self, ShimLoadError> {
        let object_tiles = load_object_tiles(&roms.object_tiles)?;
        let playfield_tiles = load_playfield_tiles(&roms.playfield_tiles)?;

        let lut = colors::table();

        let mut video = TargetVideo::new();
        video.registers = DisplayRegisters::converted_display();

        dma.fill_words(&mut video.tileset, 0);
        dma.fill_words(&mut video.sprites_a, 0);
        dma.fill_halfwords(&mut video.maps.map_a, MAP_A_CLEAR);
        dma.fill_halfwords(&mut video.maps.map_b, MAP_B_CLEAR);

        let playfield_start = PLAYFIELD_TILE_BASE * WORDS_PER_TILE;
        dma.copy_words(
            &mut video.tileset[playfield_start..playfield_start + playfield_tiles.len()],
            &playfield_tiles,
        );

        log::info!(
            "Loaded {} object tiles and {} playfield tiles",
            object_tiles.len() / WORDS_PER_TILE,
            playfield_tiles.len() / WORDS_PER_TILE
        );
        log::info!("Display registers: {:?}", video.registers);
        log::info!("Shim config:{config}");

        Ok(Self { lut, video, object_tiles, input: InputState::new(), config, frame_count: 0 })
    }

    /// Vertical blank handler: convert the palette, then the objects, then sample input.
    pub fn on_vblank<H: HostInput, D: BulkTransfer>(
        &mut self,
        arcade: &mut ArcadeMemory,
        host: &mut H,
        dma: &mut D,
    ) -> FrameReport {
        colors::convert_palette(&arcade.palette, self.lut, &mut self.video.palette);

        let objects = objects::convert_objects(
            &arcade.objects,
            &arcade.palette,
            self.lut,
            &self.object_tiles,
            dma,
            &mut self.video,
        );

        let inputs = self.input.update(host.poll(), &self.config, arcade);

        self.frame_count += 1;

        log::trace!("Frame {}: {objects:?}, {inputs:?}", self.frame_count);

        FrameReport { frame: self.frame_count, objects, inputs }
    }

    /// Arcade playfield write trap.
    pub fn on_playfield_write(&mut self, address: u16, value: u16) {
        self.video.maps.write(address, value);
    }

    #[must_use]
    pub fn video(&self) -> &TargetVideo {
        &self.video
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
