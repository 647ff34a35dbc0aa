//! urlcache - cache remote resources and keyed responses on local disk
//!
//! Thin command-line host around the library: builds the configuration,
//! sets up logging and runs one cache operation per invocation.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use urlcache::cache::{CacheKey, UrlCache};
use urlcache::cli::{Cli, CliError, Command};

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Writes a payload to stdout, or reports absence through the exit code
fn emit(payload: Option<Vec<u8>>) -> Result<ExitCode, CliError> {
    match payload {
        Some(bytes) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = cli.load_config()?;
    let ttl = cli.ttl;

    let cache = UrlCache::from_config(config)?;

    match cli.command {
        Command::Resolve {
            url,
            username,
            password,
        } => {
            match cache
                .resolve(&url, username.as_deref(), password.as_deref(), ttl)
                .await
            {
                Some(reference) => println!("{reference}"),
                None => return Ok(ExitCode::FAILURE),
            }
        }
        Command::GetResponse {
            method,
            slug,
            allow_stale,
        } => return emit(cache.get_response(&method, &slug, ttl, allow_stale)),
        Command::PutResponse {
            method,
            slug,
            payload,
        } => {
            if !cache.responses().put(&method, &slug, payload.as_bytes()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GetValue { name } => return emit(cache.get_value(&name, ttl)),
        Command::PutValue { name, value } => {
            if !cache.values().set(&name, value.as_bytes()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Key { url } => match CacheKey::derive(&url) {
            Ok(key) => println!("{key}"),
            Err(e) => {
                eprintln!("{e}");
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(2)
        }
    }
}
