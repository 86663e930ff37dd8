//! CLI command definitions using Clap.
//!
//! - `config_cmd` - Configuration file management
//! - `palette` - Palette and gradient inspection for a local image
//! - `compose` - One-shot wallpaper composition for a local image

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::AlbumPaperError;
use crate::schema;
use crate::wallpaper::BackgroundStyle;

pub mod compose;
pub mod config_cmd;
pub mod palette;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// AlbumPaper - turns the album art of whatever is playing into your wallpaper.
#[derive(Parser, Debug)]
#[command(name = "albumpaper")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Follow the configured service and keep the wallpaper in sync.
    ///
    /// This is the default when no command is given. While running, type
    /// `pause`, `resume`, `toggle`, `restart` or `quit` on stdin.
    Run,

    /// Print the palette and gradient pair extracted from an image.
    #[command(
        after_long_help = r#"Examples:
  albumpaper palette cover.jpg           # Colored swatches
  albumpaper palette cover.jpg --json    # Machine-readable output"#
    )]
    Palette {
        /// Image to analyse.
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Print JSON instead of swatches.
        #[arg(long)]
        json: bool,
    },

    /// Compose a wallpaper from a local image with the configured layers.
    #[command(
        after_long_help = r#"Examples:
  albumpaper compose cover.jpg                          # Configured style
  albumpaper compose cover.jpg --style coloredNoise     # Override the background
  albumpaper compose cover.jpg --output ~/wallpaper.jpg # Custom output path"#
    )]
    Compose {
        /// Artwork to compose.
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Background style, overriding the configuration.
        #[arg(long, short)]
        style: Option<BackgroundStyle>,

        /// Where to write the JPEG.
        /// Default: albumpaper.jpg in the current directory
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(albumpaper completions --shell zsh)"
    ///   albumpaper completions --shell fish > ~/.config/fish/completions/albumpaper.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), AlbumPaperError> {
        let config_path = self.config_path();

        if let Some(path) = &config_path
            && !path.exists()
        {
            return Err(AlbumPaperError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        match &self.command {
            None | Some(Commands::Run) => crate::supervisor::run(config_path.as_deref()),
            Some(Commands::Palette { image, json }) => palette::execute(image, *json),
            Some(Commands::Compose { image, style, output }) => {
                compose::execute(config_path.as_deref(), image, *style, output.as_deref())
            }
            Some(Commands::Config(cmd)) => config_cmd::execute(cmd, config_path.as_deref()),
            Some(Commands::Schema) => {
                println!("{}", schema::print_schema());
                Ok(())
            }
            Some(Commands::Completions { shell }) => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "albumpaper", &mut io::stdout());
    }
}
