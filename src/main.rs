mod catalog;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use catalog::SoundCatalog;
use datapack_core::{SoundSource, TargetVersion};
use midi_to_datapack::{generate, GenerateConfig, MidiData};

#[derive(Parser, Debug)]
#[command(name = "mcplaysound-gen")]
#[command(about = "Convert MIDI files to Minecraft playsound datapacks", long_about = None)]
struct Cli {
    /// Suppress informational messages (only warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a datapack from one channel of a MIDI file
    Generate(GenerateArgs),
    /// List the MIDI channels that contain notes
    Channels {
        /// Path to the MIDI file
        midi: PathBuf,
    },
    /// List the sound names of an instrument catalog
    Sounds {
        /// JSON array of sound event names
        #[arg(default_value = "soundlist.json")]
        catalog: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the MIDI file
    #[arg(short, long)]
    midi: Option<PathBuf>,

    /// Directory to create `<namespace>_midi_datapack` in
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// MIDI channel to convert (0-15)
    #[arg(long)]
    channel: Option<u8>,

    /// Tag given to players while playing
    #[arg(long)]
    tag: Option<String>,

    /// Scoreboard objective for the play head
    #[arg(long)]
    score: Option<String>,

    /// Datapack namespace (lowercase letters, digits and underscores)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Base sound event name
    #[arg(short, long)]
    instrument: Option<String>,

    /// Instrument catalog used to pick the default instrument
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Sound name for the low2 variant (default: `<instrument>_low2`)
    #[arg(long)]
    low2: Option<String>,
    /// Sound name for the low1 variant
    #[arg(long)]
    low1: Option<String>,
    /// Sound name for the mid variant
    #[arg(long)]
    mid: Option<String>,
    /// Sound name for the high1 variant
    #[arg(long)]
    high1: Option<String>,
    /// Sound name for the high2 variant
    #[arg(long)]
    high2: Option<String>,

    /// Sound source (ambient, block, ..., record, ..., `*`, or `none`)
    #[arg(long)]
    source: Option<String>,

    /// Emit stopsound commands instead of playsound
    #[arg(long)]
    stop_sound: bool,

    /// Game ticks per quarter note
    #[arg(short, long)]
    ticks_per_quarter: Option<u32>,

    /// Game ticks between samples of pitch-bent notes
    #[arg(short, long)]
    bend_resolution: Option<u32>,

    /// Target game version: 1.13-1.20 or 1.21+
    #[arg(long)]
    target_version: Option<String>,
}

impl GenerateArgs {
    fn into_config(self) -> Result<GenerateConfig> {
        let (mut config, file_instrument) = match &self.config {
            Some(path) => (GenerateConfig::from_json_file(path)?, config_sets_instrument(path)?),
            None => (GenerateConfig::default(), false),
        };

        // The catalog only fills in an instrument nobody chose
        if let Some(path) = &self.catalog {
            if self.instrument.is_none() && !file_instrument {
                let catalog = SoundCatalog::load(path)?;
                config.instrument = catalog.default_instrument().to_string();
            }
        }

        if let Some(midi) = self.midi {
            config.midi_path = midi;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(channel) = self.channel {
            config.channel = channel;
        }
        if let Some(tag) = self.tag {
            config.tag = tag;
        }
        if let Some(score) = self.score {
            config.score = score;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(instrument) = self.instrument {
            config.instrument = instrument;
        }
        if let Some(source) = self.source {
            config.sound_source = match source.trim() {
                "" | "none" => None,
                other => Some(
                    other
                        .parse::<SoundSource>()
                        .with_context(|| format!("Invalid --source '{}'", other))?,
                ),
            };
        }
        if self.stop_sound {
            config.stop_sound = true;
        }
        if let Some(rate) = self.ticks_per_quarter {
            config.output_ticks_per_quarter = rate;
        }
        if let Some(resolution) = self.bend_resolution {
            config.bend_resolution = resolution;
        }
        if let Some(version) = self.target_version {
            config.target_version = version.parse::<TargetVersion>()?;
        }

        let overrides = [self.low2, self.low1, self.mid, self.high1, self.high2];
        if overrides.iter().any(Option::is_some) {
            let mut rule = config.naming_rule();
            let [low2, low1, mid, high1, high2] = overrides;
            rule.low2 = low2.unwrap_or(rule.low2);
            rule.low1 = low1.unwrap_or(rule.low1);
            rule.mid = mid.unwrap_or(rule.mid);
            rule.high1 = high1.unwrap_or(rule.high1);
            rule.high2 = high2.unwrap_or(rule.high2);
            config.naming_rule = Some(rule);
        }

        Ok(config)
    }
}

/// Whether the JSON config file names an instrument itself
fn config_sets_instrument(path: &Path) -> Result<bool> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(value.get("instrument").is_some())
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cli.command {
        Commands::Generate(args) => {
            let config = args.into_config()?;
            let report = generate(&config)?;
            println!(
                "Datapack written to {} ({} commands from {} notes)",
                report.datapack_root.display(),
                report.commands,
                report.notes
            );
            if report.dropped_notes > 0 {
                eprintln!(
                    "{} notes were outside every instrument range and were skipped",
                    report.dropped_notes
                );
            }
            if report.too_short_notes > 0 {
                eprintln!(
                    "{} pitch-bent notes were shorter than one game tick and were skipped",
                    report.too_short_notes
                );
            }
        }
        Commands::Channels { midi } => {
            let data = MidiData::from_file(&midi)?;
            let channels = data.used_channels();
            if channels.is_empty() {
                bail!("No notes found in {}", midi.display());
            }
            for channel in channels {
                println!("Ch {}", channel);
            }
        }
        Commands::Sounds { catalog } => {
            let catalog = SoundCatalog::load(&catalog)?;
            for sound in &catalog.sounds {
                println!("{}", sound);
            }
        }
    }

    Ok(())
}
