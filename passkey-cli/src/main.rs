//! Passkey CLI - offline WebAuthn ceremony verification.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

use commands::verify::Expected;
use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  65  Verification failed or malformed input data
  66  Input file not readable";

#[derive(Parser)]
#[command(name = "passkey")]
#[command(author, version, about = "Offline WebAuthn passkey ceremony verification", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random base64url challenge
    Challenge {
        /// Number of random bytes
        #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u16).range(16..=1024))]
        bytes: u16,
    },

    /// Verify a registration (navigator.credentials.create) response
    VerifyRegistration {
        #[command(flatten)]
        expected: Expected,

        /// Credential JSON posted by the browser
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Verify an authentication (navigator.credentials.get) response
    VerifyAuthentication {
        #[command(flatten)]
        expected: Expected,

        /// Credential ID stored at registration (base64url)
        #[arg(long)]
        credential_id: String,

        /// Stored public key as a JWK file
        #[arg(long, value_name = "JWK_FILE")]
        public_key: PathBuf,

        /// Stored signature counter
        #[arg(long, default_value_t = 0)]
        sign_count: u32,

        /// Credential JSON posted by the browser
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Decode base64url authenticator data and print its fields
    Inspect {
        /// Authenticator data (base64url)
        #[arg(value_name = "AUTH_DATA")]
        auth_data: String,

        /// Check the RP ID hash against this RP ID
        #[arg(long)]
        rp_id: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Challenge { bytes } => commands::challenge::execute(usize::from(bytes), json),
        Commands::VerifyRegistration { expected, file } => {
            commands::verify::registration(&file, &expected, json)
        }
        Commands::VerifyAuthentication {
            expected,
            credential_id,
            public_key,
            sign_count,
            file,
        } => commands::verify::authentication(
            &file,
            &expected,
            &credential_id,
            &public_key,
            sign_count,
            json,
        ),
        Commands::Inspect { auth_data, rp_id } => {
            commands::inspect::execute(&auth_data, rp_id.as_deref(), json)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit = match run(cli) {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {message}", "Error:".red().bold());
    }
    std::process::exit(exit.code);
}
