//! mqcodec - inspect MQTT 3.1/3.1.1 byte streams.

mod config;
mod error;
mod inspect;

use std::fs::File;
use std::io::{self, BufWriter, Read};

use log::info;

use crate::config::Config;
use crate::error::Result;

struct Args {
    config_path: String,
    input: Option<String>,
}

fn print_help() {
    println!("mqcodec - MQTT packet stream inspector");
    println!();
    println!("Usage: mqcodec [OPTIONS] [FILE]");
    println!();
    println!("Reads a raw MQTT byte stream from FILE (or stdin when FILE is");
    println!("omitted or '-') and prints one line per packet.");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>     Config file path (default: mqcodec.toml)");
    println!("  -h, --help              Show this help message");
    println!();
    println!("Configuration:");
    println!("  Config file uses TOML format. All settings can be overridden");
    println!("  with environment variables using MQCODEC__ prefix:");
    println!();
    println!("  MQCODEC__LOG__LEVEL=debug");
    println!("  MQCODEC__LIMITS__MAX_PACKET_SIZE=2097152");
    println!("  MQCODEC__INPUT__READ_BUFFER_SIZE=65536");
    println!("  MQCODEC__OUTPUT__SHOW_PAYLOAD=false");
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = "mqcodec.toml".to_string();
    let mut input = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    config_path = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: -c requires a file path");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-" => {
                input = None;
                i += 1;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown argument: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            path => {
                if input.is_some() {
                    eprintln!("Error: only one input file may be given");
                    std::process::exit(1);
                }
                input = Some(path.to_string());
                i += 1;
            }
        }
    }

    Args { config_path, input }
}

fn run(args: &Args) -> Result<()> {
    // Load configuration from file + environment variables
    let config = Config::load(&args.config_path)?;

    // Initialize logger with configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.level))
        .init();

    info!(
        "Loaded configuration from {} (max_packet_size={}KB)",
        args.config_path,
        config.limits.max_packet_size / 1024
    );

    let reader: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let out = BufWriter::new(stdout.lock());

    let summary = inspect::inspect(reader, out, &config)?;
    info!(
        "Decoded {} packets ({} bytes) from {}",
        summary.packets,
        summary.bytes,
        args.input.as_deref().unwrap_or("stdin")
    );
    Ok(())
}

fn main() {
    let args = parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
