//! DualKV CLI Client
//!
//! Sends one request given on the command line, or prompts for requests
//! until `quit`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use dualkv::client::{self, KvClient};
use dualkv::logging::{self, LogSink};
use dualkv::{Result, Transport};

/// DualKV CLI
#[derive(Parser, Debug)]
#[command(name = "dualkv-cli")]
#[command(about = "CLI for the DualKV key-value store")]
#[command(version)]
struct Args {
    /// Server host or IP
    host: String,

    /// Server port
    port: u16,

    /// Transport: TCP or UDP (case-insensitive)
    protocol: Transport,

    /// Request to send, e.g. `PUT apple 100`; omit for an interactive prompt
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    request: Vec<String>,

    /// Seconds to wait for each response
    #[arg(short, long, default_value = "5")]
    timeout_secs: u64,

    /// Append-mode log file
    #[arg(short, long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let sink = args.log_file.as_ref().and_then(|path| match LogSink::open(path) {
        Ok(sink) => Some(sink),
        Err(e) => {
            eprintln!("Logger initialization failed for {}: {}", path.display(), e);
            None
        }
    });
    if let Err(e) = logging::init(sink.clone()) {
        eprintln!("{}", e);
    }

    let result = run(&args);

    if let Some(sink) = &sink {
        sink.close();
    }
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let addr = (args.host.as_str(), args.port);
    let timeout = Duration::from_secs(args.timeout_secs);
    let mut client = client::connect(args.protocol, addr, timeout)?;
    tracing::info!(
        "Connected to {} server at {}:{}",
        args.protocol,
        args.host,
        args.port
    );

    if !args.request.is_empty() {
        let request = args.request.join(" ");
        return send(client.as_mut(), &request);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Enter command (PUT/GET/DELETE or 'quit' to exit): ");
        io::stdout().flush()?;

        let request = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if request.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        send(client.as_mut(), &request)?;
    }

    tracing::info!("{} client closed", args.protocol);
    Ok(())
}

fn send(client: &mut dyn KvClient, request: &str) -> Result<()> {
    match client.request(request)? {
        Some(response) => {
            println!("Response: {}", response);
            tracing::info!("Sent request: {} | Received response: {}", request, response);
        }
        None => println!("No response from server. Moving to next command."),
    }
    Ok(())
}
