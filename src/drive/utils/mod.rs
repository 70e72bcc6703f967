// Utilities for the drive module
pub mod error;
pub mod fields;
pub mod path;
pub mod size;

/// Output format for CLI commands that print Drive resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per file, tab separated
    #[default]
    Human,
    /// Pretty-printed JSON as returned by the service
    Json,
}
