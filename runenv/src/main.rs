mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, HostArgs};
use runenv_core::config::{coerce, env_keys, ValueType};
use runenv_core::{observability, SystemEnv, VariableSource};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The namespace is not loaded yet; take LOG_LEVEL straight from the process.
    let level = coerce(SystemEnv.lookup(env_keys::LOG_LEVEL), ValueType::String).to_string();
    observability::init_tracing(&level, cli.log_json);

    match cli.command {
        Commands::Show { host, format } => commands::show(&host, format)?,
        Commands::Get { keys, host } => commands::get(&host, &keys)?,
        Commands::Detect {
            as_runtime,
            env_file,
        } => commands::detect(&HostArgs {
            as_runtime,
            schema: None,
            env_file,
        })?,
        Commands::Schema { schema } => commands::schema(schema.as_deref())?,
    }
    Ok(())
}
