//! elu-export - legacy ELU/ANI to GLB converter

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use elu_export::{ClipSource, ConvertOptions, FsTextureResolver, inspect, manifest};

#[derive(Parser)]
#[command(name = "elu-export")]
#[command(about = "Legacy ELU/ANI to GLB converter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every target in a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keyframe rate (overrides manifest)
        #[arg(long)]
        fps: Option<f32>,

        /// Do not fail on missing sources or failed targets
        #[arg(long)]
        allow_missing: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },

    /// Convert a single mesh file
    Convert {
        /// Input .elu file
        input: PathBuf,

        /// Animation clip as NAME=PATH (repeatable)
        #[arg(short, long = "clip", value_parser = parse_clip)]
        clips: Vec<(String, PathBuf)>,

        /// Output .glb file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keyframe rate (default: 30)
        #[arg(short, long)]
        fps: Option<f32>,

        /// Root for model/, system/ and ui/ texture names
        #[arg(long)]
        client_root: Option<PathBuf>,
    },

    /// Print the contents of an .elu or .ani file
    Inspect {
        /// Input file
        input: PathBuf,
    },
}

fn parse_clip(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=PATH, got '{}'", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Build { verbose: true, .. });
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Build {
            manifest,
            output,
            fps,
            allow_missing,
            verbose: _,
        } => {
            tracing::info!("Building assets from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            let options = manifest::BuildOptions {
                output_override: output,
                allow_missing,
                fps_override: fps,
            };
            manifest::build_all(&config, &options)?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let missing = manifest::validate(&config)?;
            if missing.is_empty() {
                tracing::info!("Manifest is valid!");
            } else {
                tracing::warn!("Manifest is valid, {} source files missing", missing.len());
            }
        }

        Commands::Convert {
            input,
            clips,
            output,
            fps,
            client_root,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("glb"));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            convert_single(&input, &clips, &output, fps, client_root.as_deref())?;
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            println!("{}", inspect::describe_file(&input)?);
        }
    }

    Ok(())
}

fn convert_single(
    input: &Path,
    clips: &[(String, PathBuf)],
    output: &Path,
    fps: Option<f32>,
    client_root: Option<&Path>,
) -> Result<()> {
    let mesh = std::fs::read(input).with_context(|| format!("Failed to read {:?}", input))?;

    let sources: Vec<ClipSource> = clips
        .iter()
        .map(|(name, path)| ClipSource {
            name: name.clone(),
            motion_type: 0,
            source: path.to_string_lossy().replace('\\', "/"),
            bytes: std::fs::read(path).ok(),
        })
        .collect();

    let mesh_dir = input.parent().unwrap_or(Path::new(""));
    let output_dir = output.parent().unwrap_or(Path::new(""));
    let resolver = FsTextureResolver::new(mesh_dir, client_root.unwrap_or(mesh_dir), output_dir);

    let mut options = ConvertOptions::default();
    if let Some(fps) = fps {
        options.frames_per_second = fps;
    }

    let converted = elu_export::convert_to_memory(&mesh, &sources, &resolver, &options)?;

    for report in &converted.clips {
        tracing::info!("clip '{}': {:?}", report.clip_name, report.status);
    }
    for diagnostic in &converted.diagnostics {
        tracing::warn!("{}", diagnostic);
    }

    std::fs::write(output, &converted.glb)
        .with_context(|| format!("Failed to write {:?}", output))?;
    Ok(())
}
