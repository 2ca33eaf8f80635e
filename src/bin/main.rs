//! Sprite Atlas CLI
//!
//! Pack sprite directories into texture atlases.

use clap::{Args, Parser, Subcommand};
use sprite_atlas::fingerprint::{hash_directory, Freshness};
use sprite_atlas::pipeline::{self, BuildOptions, BuildOutcome};
use sprite_atlas::{BuildTarget, PackerKind, PipelineConfig, SpriteRegistry};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sprite-atlas")]
#[command(author, version, about = "Pack sprite directories into texture atlases", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild every stale atlas target
    Build {
        #[command(flatten)]
        targets: TargetArgs,

        /// Rebuild even if no changes are detected
        #[arg(long)]
        force: bool,
    },

    /// Report whether each target is fresh or stale
    Status {
        #[command(flatten)]
        targets: TargetArgs,
    },

    /// Print the fingerprint of a sprite directory
    Hash {
        /// Source directory
        dir: PathBuf,
    },

    /// Resolve a sprite name to its rectangle in a manifest
    Lookup {
        /// Manifest file
        #[arg(short, long)]
        manifest: PathBuf,

        /// Sprite name (file name without extension)
        name: String,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// JSON config listing the build targets
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resource root that target paths are relative to
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Source directory of the single default target
    #[arg(long)]
    source: Option<PathBuf>,

    /// Atlas image path of the single default target
    #[arg(long)]
    atlas: Option<PathBuf>,

    /// Manifest path of the single default target
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Atlas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Atlas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Maximum number of sprites
    #[arg(long)]
    max_sprites: Option<usize>,

    /// Packing strategy
    #[arg(long, value_enum)]
    packer: Option<PackerKind>,
}

impl TargetArgs {
    fn has_target_overrides(&self) -> bool {
        self.source.is_some()
            || self.atlas.is_some()
            || self.manifest.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.max_sprites.is_some()
            || self.packer.is_some()
    }

    fn into_config(self) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                if self.has_target_overrides() {
                    return Err("target options cannot be combined with --config".into());
                }
                PipelineConfig::from_path(path)?
            }
            None => {
                let mut target = BuildTarget::default();
                if let Some(source) = self.source {
                    target.source = source;
                }
                if let Some(atlas) = self.atlas {
                    target.atlas = atlas;
                }
                if let Some(manifest) = self.manifest {
                    target.manifest = manifest;
                }
                if let Some(width) = self.width {
                    target.width = width;
                }
                if let Some(height) = self.height {
                    target.height = height;
                }
                if let Some(max_sprites) = self.max_sprites {
                    target.max_sprites = max_sprites;
                }
                if let Some(packer) = self.packer {
                    target.packer = packer;
                }
                PipelineConfig {
                    targets: vec![target],
                    ..PipelineConfig::default()
                }
            }
        };

        if let Some(root) = self.root {
            config.resource_root = root;
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Build { targets, force } => {
            let config = targets.into_config()?;
            let outcomes = pipeline::build_all(&config, BuildOptions { force })?;
            for (name, outcome) in outcomes {
                match outcome {
                    BuildOutcome::Skipped { .. } => println!("{}: up to date", name),
                    BuildOutcome::Built(report) => {
                        println!("{}: packed {} sprites", name, report.records.len());
                        if !report.manifest_written {
                            println!("  Manifest not written; will rebuild on next run");
                        }
                    }
                }
            }
        }
        Commands::Status { targets } => {
            let config = targets.into_config()?;
            for (name, freshness) in pipeline::status(&config)? {
                match freshness {
                    Freshness::Fresh => println!("{}: fresh", name),
                    Freshness::Stale(reason) => println!("{}: stale ({})", name, reason),
                }
            }
        }
        Commands::Hash { dir } => {
            println!("{}", hash_directory(&dir)?);
        }
        Commands::Lookup { manifest, name } => {
            let registry = SpriteRegistry::load(&manifest)?;
            let rect = registry
                .get(&name)
                .ok_or_else(|| format!("sprite '{}' not found in {:?}", name, manifest))?;
            println!("{} {}", name, rect);
        }
    }

    Ok(())
}
