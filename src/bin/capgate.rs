//! Capgate developer CLI
//!
//! Run with: cargo run --features cli --bin capgate -- <command>
//!
//! Commands:
//!   decode <VALUE>           - List the flags set in a permission value
//!   encode <FLAG>...         - Permission value for a set of flags
//!   eval <EXPR> [options]    - Evaluate a capability expression
//!   flags                    - Show the registry in bit order
//!   fingerprint              - Registry fingerprint

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use capgate::{Ability, AclConfig, AclContext, CapabilitySet, Result};

#[derive(Parser)]
#[command(name = "capgate", about = "Inspect permission values and capability expressions")]
struct Cli {
    /// JSON config file (defaults to $CAPGATE_CONFIG)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Decode { value: String },
    Encode { flags: Vec<String> },
    Eval {
        expression: String,
        #[arg(long, short)]
        permissions: Option<String>,
        /// Extra capability name, repeatable
        #[arg(long = "extra", short)]
        extras: Vec<String>,
        #[arg(long, short, default_value = "all")]
        subject: String,
    },
    Flags,
    Fingerprint,
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(p) => AclConfig::from_path(p)?,
        None => AclConfig::from_env()?,
    };
    let ctx = AclContext::new(config)?;

    match cli.command {
        Command::Decode { value } => {
            for name in capgate::decode_str(ctx.registry(), &value)?.iter() {
                println!("{name}");
            }
        }
        Command::Encode { flags } => {
            let set: CapabilitySet = flags.into_iter().collect();
            println!("{}", capgate::encode(ctx.registry(), &set)?);
        }
        Command::Eval { expression, permissions, extras, subject } => {
            let ability = Ability::builder(ctx.registry())
                .permissions_str(permissions.as_deref())?
                .extras(extras)
                .subject(&subject)
                .build();
            let allowed = capgate::try_evaluate(Some(expression.as_str()), Some(&ability), Some(subject.as_str()))?;
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
        Command::Flags => {
            for (bit, name) in ctx.registry().iter() {
                println!("{bit:>3}  {name}");
            }
        }
        Command::Fingerprint => println!("{}", ctx.registry().fingerprint()),
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
