//! DualKV Server Binary
//!
//! Starts a TCP or UDP server for DualKV.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use dualkv::logging::{self, LogSink};
use dualkv::{Config, MemStore, Server, Transport};

/// DualKV Server
#[derive(Parser, Debug)]
#[command(name = "dualkv-server")]
#[command(about = "In-memory key-value store over TCP or UDP")]
#[command(version)]
struct Args {
    /// Port to listen on
    port: u16,

    /// Transport: TCP or UDP (case-insensitive)
    protocol: Transport,

    /// Host or IP to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Append-mode log file [default: TCPServerLog.log or UDPServerLog.log]
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Per-connection read timeout in milliseconds, 0 disables (TCP only)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Per-connection write timeout in milliseconds, 0 disables (TCP only)
    #[arg(long, default_value = "0")]
    write_timeout_ms: u64,
}

fn main() {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| Config::default_log_file(args.protocol));

    // Console logging still works if the file cannot be opened
    let sink = match LogSink::open(&log_path) {
        Ok(sink) => Some(sink),
        Err(e) => {
            eprintln!("Logger initialization failed for {}: {}", log_path.display(), e);
            None
        }
    };

    if let Err(e) = logging::init(sink.clone()) {
        eprintln!("{}", e);
    }

    tracing::info!("DualKV Server v{}", dualkv::VERSION);

    let config = Config::builder()
        .listen_addr(format!("{}:{}", args.bind, args.port))
        .transport(args.protocol)
        .log_file(log_path)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let engine = Arc::new(MemStore::new());

    let server = match Server::bind(&config, engine, sink.clone()) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            if let Some(sink) = &sink {
                sink.close();
            }
            process::exit(1);
        }
    };

    tracing::info!("Transport: {}", server.transport());
    tracing::info!("Listening on {}", server.local_addr());

    // Ctrl+C / SIGTERM stop the serving loop
    let handle = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received termination signal, initiating shutdown...");
        handle.shutdown();
    }) {
        tracing::warn!("Failed to install signal handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        process::exit(1);
    }

    tracing::info!("Server shut down gracefully");
}
