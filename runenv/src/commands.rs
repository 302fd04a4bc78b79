//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use runenv_core::config::Schema;
use runenv_core::host::process_source;
use runenv_core::{detect_runtime, EnvManager, EnvMap, Host, RuntimeKind};

use crate::cli::{HostArgs, OutputFormat};

const DEFAULT_DOTENV: &str = ".env";

/// Host for the given overrides: the process env (over the `.env` file)
/// becomes the accessor of the `--as` runtime, node by default.
pub fn build_host(args: &HostArgs) -> Result<Host> {
    let dotenv = match &args.env_file {
        Some(path) if !path.is_file() => bail!("env file not found: {}", path.display()),
        Some(path) => path.clone(),
        None => PathBuf::from(DEFAULT_DOTENV),
    };
    let runtime = match args.as_runtime.as_deref() {
        Some(r) => r.parse::<RuntimeKind>().context("invalid --as runtime")?,
        None => RuntimeKind::Node,
    };
    let source = process_source(Some(dotenv.as_path()));
    let builder = Host::builder();
    let builder = match runtime {
        RuntimeKind::Node => builder.process(source),
        RuntimeKind::Deno => builder.deno(source),
        RuntimeKind::Worker => builder.worker(source),
    };
    Ok(builder.build())
}

pub fn load_schema(path: Option<&Path>) -> Result<Schema> {
    match path {
        Some(p) => Schema::from_file(p).with_context(|| format!("loading schema {}", p.display())),
        None => Ok(Schema::builtin().clone()),
    }
}

fn with_loaded_env<T, F>(args: &HostArgs, f: F) -> Result<T>
where
    F: FnOnce(&EnvManager<'_>) -> Result<T>,
{
    let schema = load_schema(args.schema.as_deref())?;
    let owned;
    let host = if args.is_process_default() {
        tracing::debug!("using the process host");
        Host::current()
    } else {
        tracing::debug!(
            runtime = args.as_runtime.as_deref().unwrap_or("node"),
            env_file = ?args.env_file,
            "using an override host"
        );
        owned = build_host(args)?;
        &owned
    };
    let mut env = EnvManager::with_schema(host, &schema)?;
    env.load_env().context("loading env")?;
    f(&env)
}

pub fn show(args: &HostArgs, format: OutputFormat) -> Result<()> {
    with_loaded_env(args, |env| {
        let map = env.to_object();
        match format {
            OutputFormat::Json => println!("{}", map.to_json_string()?),
            OutputFormat::Env => {
                for line in render_env_lines(&map) {
                    println!("{}", line);
                }
            }
        }
        Ok(())
    })
}

pub fn get(args: &HostArgs, keys: &[String]) -> Result<()> {
    with_loaded_env(args, |env| {
        let mut missing = Vec::new();
        for key in keys {
            match env.get(key) {
                Some(value) => println!("{}", value),
                None => missing.push(key.as_str()),
            }
        }
        if !missing.is_empty() {
            bail!("not in namespace: {}", missing.join(", "));
        }
        Ok(())
    })
}

pub fn detect(args: &HostArgs) -> Result<()> {
    println!("{}", detect_host(args)?);
    Ok(())
}

fn detect_host(args: &HostArgs) -> Result<RuntimeKind> {
    let owned;
    let host = if args.is_process_default() {
        Host::current()
    } else {
        owned = build_host(args)?;
        &owned
    };
    Ok(detect_runtime(host)?)
}

pub fn schema(path: Option<&Path>) -> Result<()> {
    let schema = load_schema(path)?;
    for line in render_schema(&schema) {
        println!("{}", line);
    }
    Ok(())
}

fn render_env_lines(map: &EnvMap) -> Vec<String> {
    map.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
}

fn render_schema(schema: &Schema) -> Vec<String> {
    schema
        .iter()
        .map(|entry| {
            let names: Vec<String> = RuntimeKind::ALL
                .iter()
                .map(|rt| format!("{}={}", rt, entry.external_name(*rt).unwrap_or("-")))
                .collect();
            format!(
                "{:<30} {:<8} {}",
                entry.key,
                entry.mapping.type_tag().as_str(),
                names.join(" ")
            )
        })
        .collect()
}
