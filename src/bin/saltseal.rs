//! Saltseal CLI - key-based file encryption
//!
//! Command-line interface for generating keys and encrypting and decrypting
//! files using NaCl secretbox (XSalsa20Poly1305) envelopes.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use saltseal::file_ops;
use saltseal::key_reader::{FileKeyReader, KeyReader, ReaderKeyReader};
use saltseal::{ErrorCategory, ErrorKind, SaltsealError};

#[derive(Parser)]
#[command(name = "saltseal")]
#[command(version)]
#[command(about = "Key-based file encryption.", long_about = None)]
struct Cli {
    /// Path to an armored key file (as written by `keygen`)
    #[arg(long, global = true, value_name = "FILE")]
    key_file: Option<PathBuf>,

    /// Read the armored key from stdin instead of from a file
    #[arg(long, global = true, conflicts_with = "key_file")]
    key_stdin: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new random key
    #[command(alias = "k")]
    Keygen {
        /// Path to write the armored key to; must not exist yet
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the encrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the unencrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update an encrypted file with new content, while validating
    /// that the key is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing saltseal file to replace with encrypted text
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match &cli.command {
        Commands::Keygen { output } => file_ops::generate_key_file(output),
        Commands::Encrypt { input, output } => get_key_reader(&cli)
            .and_then(|mut reader| file_ops::encrypt_file(input, output, &mut *reader)),
        Commands::Decrypt { input, output } => get_key_reader(&cli)
            .and_then(|mut reader| file_ops::decrypt_file(input, output, &mut *reader)),
        Commands::Update { input, output } => get_key_reader(&cli)
            .and_then(|mut reader| file_ops::update_file(input, output, &mut *reader)),
    };

    if let Err(e) = result {
        tracing::debug!(category = ?e.category, kind = ?e.kind, "command failed");
        eprintln!("Error: {}", render_chain(&e));
        process::exit(1);
    }
}

fn get_key_reader(cli: &Cli) -> saltseal::Result<Box<dyn KeyReader>> {
    if cli.key_stdin {
        return Ok(Box::new(ReaderKeyReader::new(Box::new(std::io::stdin()))));
    }
    match &cli.key_file {
        Some(path) => Ok(Box::new(FileKeyReader::new(path))),
        None => Err(SaltsealError::with_kind(
            ErrorCategory::User,
            ErrorKind::KeyUnavailable,
            "a key is required; pass --key-file FILE or --key-stdin",
        )),
    }
}

fn render_chain(err: &SaltsealError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
