//! Command-line entry point: Voice Dataset Studio.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG`, default `info`).
//! 2. Parse the command line.
//! 3. Load [`AppConfig`] from disk (returns default on first run).
//! 4. Create the [`tokio`] runtime.
//! 5. Run the selected subcommand to completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use voice_dataset_studio::{
    batch::{BatchProcessor, FsReader, ItemOutcome, ProcessedDirWriter},
    config::{AppConfig, AppPaths},
    effects::{EqGains, SoundProfile},
    export::{DatasetExporter, ExportFormat, ExportRequest},
    project::{Project, ProjectStats, SourcePolicy},
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Batch effects and dataset export for TTS recording projects.
#[derive(Parser, Debug)]
#[command(name = "voice-dataset-studio", version, about)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a sound profile to every recorded take of a project
    Process(ProcessArgs),

    /// Package recorded takes as a trainer dataset zip
    Export(ExportArgs),

    /// Manage saved sound profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Show recording progress of a project
    Stats {
        /// Project directory
        project: PathBuf,
    },

    /// Freeze the item-to-file mapping of every recorded item
    Pin {
        /// Project directory
        project: PathBuf,
    },

    /// Delete a script item and its audio files
    Delete {
        /// Project directory
        project: PathBuf,
        /// Item id
        item: String,
    },
}

/// Profile knobs given directly on the command line.
#[derive(Args, Debug, Clone, Copy)]
struct ProfileKnobs {
    /// Pitch shift in semitones (-12..=12)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pitch: i32,

    /// Low band gain in dB (-12..=12)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    low: f32,

    /// Mid band gain in dB (-12..=12)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    mid: f32,

    /// High band gain in dB (-12..=12)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    high: f32,
}

impl ProfileKnobs {
    fn into_profile(self, id: &str, name: &str) -> SoundProfile {
        SoundProfile::new(id, name, self.pitch, EqGains::new(self.low, self.mid, self.high))
    }
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Project directory
    project: PathBuf,

    /// Saved profile to apply (id or name); overrides the knobs below
    #[arg(long, value_name = "PROFILE")]
    profile: Option<String>,

    #[command(flatten)]
    knobs: ProfileKnobs,

    /// Items rendered at once (overrides settings)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Resample output to this rate; `project` uses the project's rate
    #[arg(long, value_name = "HZ|project")]
    target_rate: Option<String>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Project directory
    project: PathBuf,

    /// f5, piper, xtts, fish or ljspeech (overrides settings)
    #[arg(long, short)]
    format: Option<ExportFormat>,

    /// Destination zip (defaults to <downloads>/<project>_<format>.zip)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Speaker name for XTTS metadata and the Fish folder
    #[arg(long)]
    speaker: Option<String>,

    /// per_file or whole_export (overrides settings)
    #[arg(long)]
    policy: Option<SourcePolicy>,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// List saved profiles
    List,

    /// Save a profile (replaces one with the same id)
    Add {
        /// Profile id
        id: String,
        /// Display name
        name: String,
        #[command(flatten)]
        knobs: ProfileKnobs,
    },

    /// Delete a saved profile
    Remove {
        /// Profile id
        id: String,
    },
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Command line
    let cli = Cli::parse();
    let settings_file = cli
        .config
        .clone()
        .unwrap_or_else(|| AppPaths::new().settings_file);

    // 3. Configuration. Commands that rewrite settings must not silently
    //    replace an unreadable file with defaults.
    let config = match AppConfig::load_from(&settings_file) {
        Ok(config) => config,
        Err(e) if !matches!(cli.command, Command::Profiles { .. }) => {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }
        Err(e) => {
            return Err(e.context(format!("reading {}", settings_file.display())));
        }
    };

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Dispatch
    rt.block_on(async {
        match cli.command {
            Command::Process(args) => run_process(args, &config).await,
            Command::Export(args) => run_export(args, &config).await,
            Command::Profiles { action } => run_profiles(action, config, &settings_file),
            Command::Stats { project } => run_stats(&project),
            Command::Pin { project } => run_pin(&project),
            Command::Delete { project, item } => run_delete(&project, &item),
        }
    })
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn run_process(args: ProcessArgs, config: &AppConfig) -> Result<()> {
    let project = Project::load(&args.project)?;

    let profile = match &args.profile {
        Some(key) => config
            .find_profile(key)
            .cloned()
            .with_context(|| format!("no saved profile {key:?}"))?,
        None => args.knobs.into_profile("cli", "Command line"),
    };
    profile.validate()?;

    let mut config = config.clone();
    if let Some(n) = args.concurrency {
        config.batch.concurrency = n;
    }
    match args.target_rate.as_deref() {
        None => {}
        Some("project") => config.batch.target_sample_rate = Some(project.target_sample_rate),
        Some(hz) => {
            let hz: u32 = hz
                .parse()
                .with_context(|| format!("invalid --target-rate {hz:?}"))?;
            config.batch.target_sample_rate = Some(hz);
        }
    }

    let items = project.batch_items();
    if items.is_empty() {
        log::warn!("No recorded items in {}", project.path.display());
        return Ok(());
    }

    let processor = BatchProcessor::from_config(
        &config,
        Arc::new(FsReader),
        Arc::new(ProcessedDirWriter::new(&project.path)),
    );

    // Ctrl-C stops dequeuing; in-flight items still finish.
    let cancel = processor.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted; finishing in-flight items");
            cancel.cancel();
        }
    });

    let report = processor
        .process(items, &profile, |done, total| {
            log::info!("Processed {done}/{total}");
        })
        .await;

    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Processed { output } => println!("ok      {}  {}", item.id, output.display()),
            ItemOutcome::Failed(e) => println!("failed  {}  {e}", item.id),
            ItemOutcome::Cancelled => println!("skipped {}", item.id),
        }
    }
    println!(
        "{} of {} processed with profile {:?}",
        report.processed_count(),
        report.completed(),
        profile.name
    );
    Ok(())
}

async fn run_export(args: ExportArgs, config: &AppConfig) -> Result<()> {
    let project = Project::load(&args.project)?;
    let format = args.format.unwrap_or(config.export.default_format);

    let destination = args.output.unwrap_or_else(|| {
        AppPaths::new()
            .export_dir
            .join(format!("{}_{format}.zip", file_stem_for(&project)))
    });
    let speaker = args
        .speaker
        .unwrap_or_else(|| config.export.speaker_name.clone());

    let mut exporter = DatasetExporter::from_config(&config.export);
    if let Some(policy) = args.policy {
        exporter = exporter.with_source_policy(policy);
    }

    let request = ExportRequest::new(destination, &project.path, project.items, format)
        .with_speaker(speaker);
    let path = exporter.export_in_background(request).await?;

    println!("{}", path.display());
    Ok(())
}

fn run_profiles(action: ProfileAction, mut config: AppConfig, settings_file: &Path) -> Result<()> {
    match action {
        ProfileAction::List => {
            if config.profiles.is_empty() {
                println!("no saved profiles");
            }
            for p in &config.profiles {
                println!(
                    "{:<12} {:<20} pitch {:+3}  eq {:+.1}/{:+.1}/{:+.1} dB",
                    p.id, p.name, p.pitch, p.eq.low, p.eq.mid, p.eq.high
                );
            }
        }
        ProfileAction::Add { id, name, knobs } => {
            config.add_profile(knobs.into_profile(&id, &name))?;
            config.save_to(settings_file)?;
            log::info!("Saved profile {id}");
        }
        ProfileAction::Remove { id } => {
            if !config.remove_profile(&id) {
                bail!("no saved profile with id {id:?}");
            }
            config.save_to(settings_file)?;
            log::info!("Removed profile {id}");
        }
    }
    Ok(())
}

fn run_stats(project_dir: &Path) -> Result<()> {
    let project = Project::load(project_dir)?;
    println!("{}: {}", project.name, ProjectStats::from_items(&project.items));
    Ok(())
}

fn run_pin(project_dir: &Path) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    let pinned = project.pin_source_filenames();
    if pinned > 0 {
        project.save()?;
    }
    println!("pinned {pinned} item(s)");
    Ok(())
}

fn run_delete(project_dir: &Path, id: &str) -> Result<()> {
    let mut project = Project::load(project_dir)?;
    match project.delete_item(id)? {
        Some(item) => {
            project.save()?;
            println!("deleted {} [{}] ({:?})", item.id, item.status.label(), item.text);
            Ok(())
        }
        None => bail!("no item with id {id:?}"),
    }
}

/// Archive-safe stem from the project name.
fn file_stem_for(project: &Project) -> String {
    let stem: String = project
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "dataset".into()
    } else {
        stem
    }
}
