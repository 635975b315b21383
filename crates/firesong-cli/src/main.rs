//! Firesong command line.
//!
//! The world lives in a JSON snapshot on disk. Every subcommand loads
//! it, does one thing, and writes it back, so a play session is a series
//! of short invocations:
//!
//! ```text
//! firesong new
//! firesong advance
//! firesong setlist heartbeat deep_fire
//! firesong teach Grok Ember-Eye deep_fire
//! firesong cross caves
//! ```
//!
//! Tuning overrides are read from `firesong.toml` in the working
//! directory when present; every value has a default.

mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use firesong_sim::{Sim, SimConfig};
use firesong_types::{EraId, Event};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "firesong", about = "An oral tradition, one season at a time")]
struct Cli {
    /// Path to the world snapshot.
    #[arg(long, default_value = "firesong.json")]
    state: PathBuf,

    /// Path to a tuning file. Defaults to `firesong.toml` if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for this invocation's randomness.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// What to do with the world.
#[derive(Debug, Subcommand)]
enum Command {
    /// Start a fresh world, overwriting any existing snapshot.
    New,
    /// Advance one or more seasons.
    Advance {
        /// How many seasons to run.
        #[arg(default_value_t = 1)]
        seasons: u32,
    },
    /// Show the band, the setlist, the tree, and the spirits.
    Status,
    /// List every verse the band holds.
    Verses,
    /// Replace the setlist with the named verses, first sung first.
    Setlist {
        /// Verse ids, in singing order.
        verses: Vec<String>,
    },
    /// Move a verse to the front of the setlist.
    Prioritize {
        /// Verse id.
        verse: String,
    },
    /// One focused teaching session.
    Teach {
        /// The teacher's name.
        teacher: String,
        /// The student's name.
        student: String,
        /// Verse id.
        verse: String,
    },
    /// Carve a verse onto the tree.
    Carve {
        /// Verse id.
        verse: String,
    },
    /// Fell the tree.
    Fell,
    /// Gather the fragments of a felled tree.
    Gather,
    /// Take the waiting stranger into the band.
    Welcome,
    /// Turn the waiting stranger away.
    Ignore,
    /// Study a verse heard in the ashes.
    StudyAsh {
        /// Verse id.
        verse: String,
    },
    /// List bridges, or cross into the named era.
    Cross {
        /// Destination era key. Omit to list the bridges.
        target: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = load_sim_config(cli.config.as_deref())?;
    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    match cli.command.unwrap_or(Command::Status) {
        Command::New => {
            let sim = Sim::new(config, &mut rng);
            if let Some(era) = sim.catalog().era(sim.state().era.as_str()) {
                println!("{}", era.name);
                println!("{}", era.desc);
            }
            sim.save(&cli.state).context("saving the new world")?;
        }
        Command::Advance { seasons } => {
            let mut sim = load(&cli.state, config)?;
            for _ in 0..seasons {
                print_events(&sim.advance_season(&mut rng));
                if sim.state().collapsed {
                    break;
                }
            }
            sim.save(&cli.state).context("saving the world")?;
        }
        Command::Status => {
            let sim = load(&cli.state, config)?;
            render::status(&sim);
        }
        Command::Verses => {
            let sim = load(&cli.state, config)?;
            render::verses(&sim);
        }
        Command::Setlist { verses } => {
            act(&cli.state, config, |sim| sim.set_setlist(&verses))?;
        }
        Command::Prioritize { verse } => {
            act(&cli.state, config, |sim| sim.prioritize(&verse))?;
        }
        Command::Teach { teacher, student, verse } => {
            act(&cli.state, config, |sim| sim.teach(&teacher, &student, &verse))?;
        }
        Command::Carve { verse } => {
            act(&cli.state, config, |sim| sim.carve(&verse))?;
        }
        Command::Fell => {
            act(&cli.state, config, |sim| sim.fell(&mut rng))?;
        }
        Command::Gather => {
            act(&cli.state, config, |sim| sim.gather())?;
        }
        Command::Welcome => {
            act(&cli.state, config, |sim| sim.welcome())?;
        }
        Command::Ignore => {
            act(&cli.state, config, |sim| sim.ignore())?;
        }
        Command::StudyAsh { verse } => {
            act(&cli.state, config, |sim| sim.study_ash(&verse))?;
        }
        Command::Cross { target: None } => {
            let sim = load(&cli.state, config)?;
            render::bridges(&sim);
        }
        Command::Cross { target: Some(target) } => {
            let mut sim = load(&cli.state, config)?;
            let from = sim.state().era.to_string();
            match sim.cross(&EraId::from(target.as_str()), &mut rng) {
                Ok(events) => {
                    for line in firesong_catalog::eras::montage(&from, &target) {
                        println!("{line}");
                    }
                    print_events(&events);
                    if let Some(era) = sim.catalog().era(target.as_str()) {
                        println!();
                        println!("{}", era.name);
                        println!("{}", era.desc);
                    }
                    sim.save(&cli.state).context("saving the world")?;
                }
                Err(err) => println!("{err}"),
            }
        }
    }
    Ok(())
}

/// Load the world snapshot, with a friendlier error when it is missing.
fn load(path: &Path, config: SimConfig) -> Result<Sim> {
    Sim::load(path, config)
        .with_context(|| format!("no world at {} — run `firesong new` first", path.display()))
}

/// Load, run one action, print what happened, save. A refused action
/// prints its reason and leaves the snapshot untouched.
fn act<F>(path: &Path, config: SimConfig, action: F) -> Result<()>
where
    F: FnOnce(&mut Sim) -> Result<Vec<Event>, firesong_sim::ActionError>,
{
    let mut sim = load(path, config)?;
    match action(&mut sim) {
        Ok(events) => {
            print_events(&events);
            sim.save(path).context("saving the world")?;
        }
        Err(err) => println!("{err}"),
    }
    Ok(())
}

/// Print a batch of events in order.
fn print_events(events: &[Event]) {
    for event in events {
        println!("{event}");
    }
}

/// Read tuning overrides: an explicit `--config` file, or `firesong.toml`
/// in the working directory, or pure defaults.
fn load_sim_config(path: Option<&Path>) -> Result<SimConfig> {
    let source = match path {
        Some(p) => config::File::from(p.to_path_buf()),
        None => config::File::new("firesong.toml", config::FileFormat::Toml).required(false),
    };
    let raw = config::Config::builder()
        .add_source(source)
        .build()
        .context("reading the tuning file")?;
    raw.try_deserialize().context("parsing the tuning file")
}
