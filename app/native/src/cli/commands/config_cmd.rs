//! Config CLI commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::cli::output::format_bool;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::AlbumPaperError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a configuration file with every option documented.
    ///
    /// All options are commented out and show their default values.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  albumpaper config init                             # Create config at default location
  albumpaper config init --force                     # Overwrite existing config
  albumpaper config init --path ~/albumpaper.jsonc   # Create at custom path
  albumpaper config init --stdout                    # Print template to stdout"#
    )]
    Init {
        /// Overwrite the configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses ~/.config/albumpaper/config.jsonc
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the template to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// List the configuration search paths and mark the active one.
    Path,

    /// Load the configuration and check the service credentials.
    Check,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands, config_path: Option<&Path>) -> Result<(), AlbumPaperError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                println!("{}", generate_config_template());
                return Ok(());
            }

            let target = path.clone().or_else(|| config_paths().into_iter().next());
            let target = target.ok_or_else(|| {
                AlbumPaperError::ConfigError("No configuration directory available".to_string())
            })?;
            init_config(&target, *force)?;
            println!("Configuration file created at: {}", target.display());
            println!("Uncomment the options you want to change.");
            Ok(())
        }
        ConfigCommands::Path => {
            print_search_paths(config_path);
            Ok(())
        }
        ConfigCommands::Check => check_config(config_path),
    }
}

/// Writes the template to `target`, refusing to overwrite unless `force`.
fn init_config(target: &Path, force: bool) -> Result<(), AlbumPaperError> {
    if target.exists() && !force {
        return Err(AlbumPaperError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            target.display()
        )));
    }

    create_config_file(target).map_err(|e| {
        AlbumPaperError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            target.display()
        ))
    })
}

fn print_search_paths(custom: Option<&Path>) {
    if let Some(path) = custom {
        println!("Using --config: {}", path.display());
        return;
    }

    println!("Configuration file search paths (in priority order):\n");

    let paths = config_paths();
    let active = paths.iter().position(|path| path.exists());

    for (i, path) in paths.iter().enumerate() {
        let marker = match active {
            Some(index) if index == i => " (active)",
            _ if path.exists() => " (exists)",
            _ => "",
        };
        println!("  {}. {}{marker}", i + 1, path.display());
    }

    if active.is_none() {
        println!("\nNo configuration file found. Run 'albumpaper config init' to create one.");
    }
}

fn check_config(custom: Option<&Path>) -> Result<(), AlbumPaperError> {
    let loaded = config::load(custom)?;
    let keys = loaded.api_keys();
    let validation = loaded.config.validate_service(&keys);

    match &loaded.path {
        Some(path) => println!("Config:   {}", path.display()),
        None => println!("Config:   (defaults)"),
    }
    println!("Service:  {}", loaded.config.service.name);
    println!("Images:   {}", loaded.images_dir().display());
    println!("Interval: {:?}", loaded.config.request_interval());
    println!("Keys:     {}", format_bool(validation.is_ok()));

    validation.map_err(AlbumPaperError::from)
}
