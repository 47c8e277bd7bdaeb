//! Scheduler settings CLI
//!
//! Administrative tool to inspect and regenerate the scheduler settings file.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use scheduler_settings::{
    Settings, load_settings,
    config::keys,
    util::{SecretString, rand_auth_token},
    write_settings,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Inspect and write scheduler settings
#[derive(Parser, Debug)]
#[command(name = "scheduler-settings")]
#[command(version, about, long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SCHEDULER_SETTINGS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "SCHEDULER_SETTINGS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load settings and print them with secrets redacted
    Show {
        /// Path to the INI settings file (ignored when ENV_CONFIG=open)
        #[arg(short, long, env = "SCHEDULER_SETTINGS_CONFIG", default_value = "conf/app.ini")]
        config: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write key/value pairs to a settings file, replacing it
    Write {
        /// Destination INI file
        #[arg(short, long)]
        output: String,

        /// Alternating keys and values
        pairs: Vec<String>,
    },

    /// Write a complete settings file populated with defaults
    Init {
        /// Destination INI file
        #[arg(short, long)]
        output: String,
    },
}

const SECRET_KEYS: [&str; 3] = [
    keys::DB_PASSWORD.ini,
    keys::API_SECRET.ini,
    keys::AUTH_SECRET.ini,
];

fn print_settings(settings: &Settings) {
    let pairs = settings.to_pairs();
    for pair in pairs.chunks_exact(2) {
        let (key, value) = (&pair[0], &pair[1]);
        if SECRET_KEYS.contains(&key.as_str()) && !value.is_empty() {
            println!("{key} = [REDACTED]");
        } else {
            println!("{key} = {value}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let (text, json) = match args.log_format {
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stderr)), None),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(text)
        .with(json)
        .with(filter)
        .init();

    match args.command {
        Command::Show { config, json } => {
            let settings = load_settings(&config)
                .inspect_err(|e| error!(error = %e, "Failed to load settings"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings);
            }
        }
        Command::Write { output, pairs } => {
            write_settings(&pairs, &output)
                .inspect_err(|e| error!(error = %e, "Failed to write settings"))?;
        }
        Command::Init { output } => {
            // Persist a secret so it survives restarts
            let settings = Settings {
                auth_secret: SecretString::new(rand_auth_token()),
                ..Settings::default()
            };
            write_settings(&settings.to_pairs(), &output)
                .with_context(|| format!("failed to initialize {output}"))?;
            info!(path = %output, "Initialized settings file with defaults");
        }
    }

    Ok(())
}
