//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Session command arguments.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Read commands from this file instead of standard input
    #[arg(short, long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Output format (overrides configuration)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Required-field policy (overrides configuration)
    #[arg(short, long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Only print tables and charts when asked
    #[arg(long)]
    pub no_render: bool,
}

/// Fields command arguments.
#[derive(Debug, Args)]
pub struct FieldsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Required-field policy (overrides configuration)
    #[arg(short, long, value_enum)]
    pub policy: Option<PolicyArg>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Required-field policy argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Everything but interference is required
    AllBands,
    /// 5GHz measurements are optional too
    PrimaryBand,
}

impl From<PolicyArg> for crate::room::RequiredPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AllBands => Self::AllBands,
            PolicyArg::PrimaryBand => Self::PrimaryBand,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables and bar charts
    #[default]
    Table,
    /// JSON output
    Json,
}

impl From<OutputFormat> for crate::config::OutputFormat {
    fn from(arg: OutputFormat) -> Self {
        match arg {
            OutputFormat::Table => Self::Table,
            OutputFormat::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RequiredPolicy;

    #[test]
    fn test_policy_arg_conversion() {
        assert_eq!(
            RequiredPolicy::from(PolicyArg::AllBands),
            RequiredPolicy::AllBands
        );
        assert_eq!(
            RequiredPolicy::from(PolicyArg::PrimaryBand),
            RequiredPolicy::PrimaryBand
        );
    }

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            crate::config::OutputFormat::from(OutputFormat::Json),
            crate::config::OutputFormat::Json
        );
        assert_eq!(
            crate::config::OutputFormat::from(OutputFormat::Table),
            crate::config::OutputFormat::Table
        );
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_session_args_debug() {
        let args = SessionArgs {
            script: Some(PathBuf::from("survey.txt")),
            format: None,
            policy: Some(PolicyArg::PrimaryBand),
            no_render: false,
        };
        let debug_str = format!("{args:?}");
        assert!(debug_str.contains("survey.txt"));
        assert!(debug_str.contains("PrimaryBand"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
