use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// runenv - show the normalized env namespace a node / deno / worker host resolves
#[derive(Parser, Debug)]
#[command(name = "runenv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, env = "RUNENV_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and print the whole namespace
    Show {
        #[command(flatten)]
        host: HostArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Load and print selected keys, one per line
    Get {
        /// Internal keys, e.g. logLevel fetchTimeout
        #[arg(value_name = "KEY", required = true)]
        keys: Vec<String>,

        #[command(flatten)]
        host: HostArgs,
    },

    /// Print the runtime this host is detected as
    Detect {
        /// Read the process environment as this runtime's accessor: node, deno or worker
        #[arg(long = "as", value_name = "RUNTIME")]
        as_runtime: Option<String>,

        /// .env file layered under the process environment (default: ./.env if present)
        #[arg(long, value_name = "FILE")]
        env_file: Option<PathBuf>,
    },

    /// List schema keys with their type and per-runtime variable names
    Schema {
        /// Schema document (YAML) replacing the built-in schema
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Read the process environment as this runtime's accessor: node, deno or worker
    #[arg(long = "as", value_name = "RUNTIME")]
    pub as_runtime: Option<String>,

    /// Schema document (YAML) replacing the built-in schema
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// .env file layered under the process environment (default: ./.env if present)
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

impl HostArgs {
    /// No overrides: the real process host applies.
    pub fn is_process_default(&self) -> bool {
        self.as_runtime.is_none() && self.env_file.is_none()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty JSON object in schema order
    Json,
    /// KEY=value lines
    Env,
}
