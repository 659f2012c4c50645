//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// ipgeo - IP geolocation lookup service
#[derive(Parser, Debug)]
#[command(name = "ipgeo")]
#[command(version)]
#[command(about = "IP-to-location lookup service backed by GeoLite2 CSV datasets", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Load the dataset once and print the location of each address as JSON
    Lookup {
        /// IPv4 or IPv6 addresses
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Dataset URI overriding dataset.url (file://, http://, https://)
        #[arg(long)]
        dataset: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
