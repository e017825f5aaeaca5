use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::manifest::ProjectManifest;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The site root; defaults to the manifest's `root`, else the current directory.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
    /// Path to a `siteops.toml` manifest.
    ///
    /// When omitted, `<root>/siteops.toml` is used if it exists; otherwise built-in defaults apply.
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Wrap targeted `<img>` elements in `<picture>` with a WebP source.
    Picture(PictureCli),
    /// Convert raster images to WebP next to the originals.
    Optimize(OptimizeCli),
    /// Add the floating widget includes and remove the legacy call button.
    Widget(WidgetCli),
}

#[derive(Parser, Debug, Default)]
pub struct PictureCli {
    /// Explicit pages to process instead of every page matching the pattern.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,
    /// Only images whose `src` starts with this prefix are converted.
    #[arg(long)]
    target_prefix: Option<String>,
}

#[derive(Parser, Debug, Default)]
pub struct OptimizeCli {
    /// Image directory, relative to the root.
    #[arg(long)]
    directory: Option<PathBuf>,
    /// WebP quality (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: Option<u8>,
    /// Skip images smaller than this many bytes.
    #[arg(long)]
    min_size: Option<u64>,
}

#[derive(Parser, Debug, Default)]
pub struct WidgetCli {}

impl Cli {
    pub fn execute(self) -> ExitCode {
        match self.run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                tracing::debug!("fatal: {error:?}");
                eprintln!("{}", fatal_line(&error));
                ExitCode::FAILURE
            }
        }
    }

    fn run(self) -> Result<()> {
        let mut manifest = ProjectManifest::resolve(self.root.as_deref(), self.manifest.as_deref())?;
        match self.command {
            Command::Picture(picture_cli) => {
                picture_cli.apply(&mut manifest);
                manifest.validate()?;
                crate::tasks::picture::update_pictures(&manifest)?;
            }
            Command::Optimize(optimize_cli) => {
                optimize_cli.apply(&mut manifest);
                manifest.validate()?;
                crate::tasks::optimize::optimize_images(&manifest)?;
            }
            Command::Widget(WidgetCli {}) => {
                crate::tasks::widget::add_widget(&manifest)?;
            }
        }
        Ok(())
    }
}

/// The one console line printed for a fatal error.
fn fatal_line(error: &crate::error::Error) -> String {
    format!("[ERROR] {error}")
}

impl PictureCli {
    fn apply(self, manifest: &mut ProjectManifest) {
        if !self.files.is_empty() {
            manifest.picture.files = self.files;
        }
        if let Some(target_prefix) = self.target_prefix {
            manifest.picture.target_prefix = target_prefix;
        }
    }
}

impl OptimizeCli {
    fn apply(self, manifest: &mut ProjectManifest) {
        if let Some(directory) = self.directory {
            manifest.optimize.directory = directory;
        }
        if let Some(quality) = self.quality {
            manifest.optimize.quality = quality;
        }
        if let Some(min_size) = self.min_size {
            manifest.optimize.min_size = min_size;
        }
    }
}
