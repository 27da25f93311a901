use clap::{Parser, Subcommand};
use gtpv2c::layer::LayerRegistry;
use gtpv2c::packet::message::Gtpv2MessageType;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

mod process;
mod stats;

use process::{DumpOptions, EncodeRequest};

#[derive(Parser, Debug)]
#[command(name = "gtpv2c-tool")]
#[command(about = "GTPv2-C header decoder and encoder", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode hex-encoded GTPv2-C messages
    Decode {
        /// Messages as hex strings
        #[arg(value_name = "HEX")]
        messages: Vec<String>,

        /// Read messages from a file, one hex string per line
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// print headers as JSON
        #[arg(short, long)]
        json: bool,

        /// print every decoded layer
        #[arg(short, long)]
        layers: bool,

        /// print statistics at the end
        #[arg(short, long)]
        stats: bool,
    },

    /// Encode a GTPv2-C header and print it as hex
    Encode {
        /// Message type, by name (`echo-request`) or number
        #[arg(short, long)]
        message_type: Gtpv2MessageType,

        /// Tunnel endpoint identifier; sets the T flag
        #[arg(short, long, value_parser = process::parse_u32)]
        teid: Option<u32>,

        /// Sequence number (24 bits)
        #[arg(short, long, default_value = "0", value_parser = process::parse_u32)]
        sequence: u32,

        /// Message length field; defaults to the length of header and body
        #[arg(short, long, value_parser = process::parse_u16)]
        length: Option<u16>,

        /// Set the piggybacking flag
        #[arg(short, long)]
        piggyback: bool,

        /// Message body as hex
        #[arg(short, long, value_name = "HEX")]
        body: Option<String>,
    },
}

fn main() {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Decode {
            messages,
            file,
            json,
            layers,
            stats,
        } => run_decode(messages, file, DumpOptions { json, layers }, stats),
        Command::Encode {
            message_type,
            teid,
            sequence,
            length,
            piggyback,
            body,
        } => body
            .as_deref()
            .map(process::parse_hex)
            .transpose()
            .and_then(|body| {
                run_encode(&EncodeRequest {
                    message_type,
                    teid,
                    sequence_number: sequence,
                    message_length: length,
                    piggyback,
                    body: body.unwrap_or_default(),
                })
            }),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run_decode(
    mut messages: Vec<String>,
    file: Option<PathBuf>,
    dump: DumpOptions,
    print_stats: bool,
) -> Result<(), String> {
    if let Some(path) = file {
        info!("Reading messages from {:?}", path);
        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        messages.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }

    if messages.is_empty() {
        return Err("no messages to decode".to_string());
    }

    let registry = LayerRegistry::with_gtpv2c();
    let stats = stats::Stats::default();
    let mut local_stats = stats::LocalStats::new();
    let mut failures = 0u64;

    for (index, message) in messages.iter().enumerate() {
        let index = index as u64 + 1;

        let data = match process::parse_hex(message) {
            Ok(data) => data,
            Err(e) => {
                error!("message {}: {}", index, e);
                local_stats.total_messages += 1;
                local_stats.bad_input += 1;
                failures += 1;
                continue;
            }
        };

        if let Err(e) =
            process::process_message(index, &data, &registry, &mut local_stats, &stats, dump)
        {
            error!("{}", e);
            failures += 1;
        }
    }

    // Final flush of local stats
    local_stats.flush(&stats);

    if print_stats {
        println!("{stats}");
    }

    info!(
        "Processed {} messages, {} failed",
        messages.len(),
        failures
    );

    match failures {
        0 => Ok(()),
        n => Err(format!("{} of {} messages failed to decode", n, messages.len())),
    }
}

fn run_encode(request: &EncodeRequest) -> Result<(), String> {
    let bytes = process::encode_message(request)?;
    println!("{}", hex::encode(bytes));
    Ok(())
}
