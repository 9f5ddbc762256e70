mod trace;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use shim_common::frontend::{HostInput, HostInputState};
use shim_config::{ServiceSwitchMode, ShimConfig};
use shim_core::dma::ImmediateTransfer;
use shim_core::{ArcadeMemory, FrameReport, ShimCore, TileRoms};
use std::fs;
use std::path::{Path, PathBuf};
use trace::TraceCommand;

const INPUT_OPTIONS_HEADING: &str = "Input Options";
const OUTPUT_OPTIONS_HEADING: &str = "Output Options";

#[derive(Parser)]
struct Args {
    /// Object tile ROM path (4bpp, 4 tiles per object)
    #[arg(long)]
    object_tiles: PathBuf,

    /// Playfield tile ROM path (4bpp, pre-shifted copies followed by logo tiles)
    #[arg(long)]
    playfield_tiles: PathBuf,

    /// TOML config file; command line options override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Event trace to replay; without one, a single vertical blank is run
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Do not overwrite the arcade's analog calibration block every frame
    #[arg(long, default_value_t, help_heading = INPUT_OPTIONS_HEADING)]
    no_analog_calibration: bool,

    /// Do not let d-pad directions pin the analog channels to their rails
    #[arg(long, default_value_t, help_heading = INPUT_OPTIONS_HEADING)]
    no_dpad_analog_override: bool,

    /// Service switch behavior (toggle / hold)
    #[arg(long, help_heading = INPUT_OPTIONS_HEADING)]
    service_switch: Option<ServiceSwitchMode>,

    /// Write the final target video state here (bincode)
    #[arg(long, help_heading = OUTPUT_OPTIONS_HEADING)]
    dump_state: Option<PathBuf>,

    /// Write the final target palette RAM here (raw little-endian words)
    #[arg(long, help_heading = OUTPUT_OPTIONS_HEADING)]
    dump_palette: Option<PathBuf>,
}

impl Args {
    fn shim_config(&self) -> anyhow::Result<ShimConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Unable to parse config file '{}'", path.display()))?
            }
            None => ShimConfig::default(),
        };

        if self.no_analog_calibration {
            config.force_analog_calibration = false;
        }
        if self.no_dpad_analog_override {
            config.dpad_overrides_analog = false;
        }
        if let Some(service_switch) = self.service_switch {
            config.service_switch = service_switch;
        }

        Ok(config)
    }
}

/// Host input driven by the trace; holds the last `input` command.
#[derive(Debug, Default)]
struct ScriptedInput {
    state: HostInputState,
}

impl HostInput for ScriptedInput {
    fn poll(&mut self) -> HostInputState {
        self.state
    }
}

#[derive(Debug, Default)]
struct ReplaySummary {
    playfield_writes: u64,
    peak_live_objects: u8,
    frames_with_palette_fallback: u64,
    last_report: Option<FrameReport>,
}

impl ReplaySummary {
    fn record(&mut self, report: FrameReport) {
        self.peak_live_objects = self.peak_live_objects.max(report.objects.live_objects);
        if report.objects.palette_fallbacks != 0 {
            self.frames_with_palette_fallback += 1;
        }
        self.last_report = Some(report);
    }
}

fn read_rom(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Unable to read ROM file '{}'", path.display()))
}

fn replay(
    shim: &mut ShimCore,
    commands: &[TraceCommand],
    dma: &mut ImmediateTransfer,
) -> ReplaySummary {
    let mut arcade = ArcadeMemory::new();
    let mut host = ScriptedInput::default();
    let mut summary = ReplaySummary::default();

    for &command in commands {
        match command {
            TraceCommand::Palette { index, value } => arcade.palette[usize::from(index)] = value,
            TraceCommand::Object { slot, value } => arcade.objects[slot] = value,
            TraceCommand::Playfield { address, value } => {
                shim.on_playfield_write(address, value);
                summary.playfield_writes += 1;
            }
            TraceCommand::Input(state) => host.state = state,
            TraceCommand::Select { channel } => arcade.analog_select[channel] = 1,
            TraceCommand::VBlank { count } => {
                for _ in 0..count {
                    let report = shim.on_vblank(&mut arcade, &mut host, dma);
                    log::debug!("{report:?}");
                    summary.record(report);
                }
            }
        }
    }

    summary
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.shim_config()?;

    let roms = TileRoms {
        object_tiles: read_rom(&args.object_tiles)?,
        playfield_tiles: read_rom(&args.playfield_tiles)?,
    };

    let commands = match &args.trace {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Unable to read trace file '{}'", path.display()))?;
            trace::parse(&text)
                .with_context(|| format!("Invalid trace file '{}'", path.display()))?
        }
        None => vec![TraceCommand::VBlank { count: 1 }],
    };

    let mut dma = ImmediateTransfer::new();
    let mut shim = ShimCore::create(roms, config, &mut dma)?;

    let summary = replay(&mut shim, &commands, &mut dma);

    log::info!(
        "Replayed {} frames and {} playfield writes; peak {} live objects, {} frames out of object palettes",
        shim.frame_count(),
        summary.playfield_writes,
        summary.peak_live_objects,
        summary.frames_with_palette_fallback
    );
    if let Some(report) = summary.last_report {
        log::info!("Last frame: {:?} {:?}", report.objects, report.inputs);
    }
    log::info!(
        "DMA: {} transfers, {} units",
        dma.transfers(),
        dma.units_transferred()
    );

    if let Some(path) = &args.dump_state {
        let bytes = bincode::encode_to_vec(shim.video(), bincode::config::standard())?;
        fs::write(path, bytes)
            .with_context(|| format!("Unable to write state dump '{}'", path.display()))?;
        log::info!("Wrote target video state to '{}'", path.display());
    }

    if let Some(path) = &args.dump_palette {
        let palette = shim.video().palette.map(u16::to_le);
        fs::write(path, bytemuck::cast_slice::<u16, u8>(&palette))
            .with_context(|| format!("Unable to write palette dump '{}'", path.display()))?;
        log::info!("Wrote target palette to '{}'", path.display());
    }

    Ok(())
}
