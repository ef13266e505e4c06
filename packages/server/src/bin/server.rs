//! Project collaboration room server.
//!
//! Accepts WebSocket connections on `/ws`, groups them into per-project rooms
//! and relays collaboration events between room members.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atelier-server
//! cargo run --bin atelier-server -- --host 0.0.0.0 --port 3000
//! ATELIER_PORT=9000 ATELIER_LOG_LEVEL=info cargo run --bin atelier-server
//! ```

use std::sync::Arc;

use atelier_server::app::build_server;
use atelier_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atelier-server")]
#[command(about = "Real-time project collaboration room server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ATELIER_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ATELIER_PORT", default_value = "8080")]
    port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "ATELIER_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_BIN_NAME"),
        &args.log_level,
    );

    let server = build_server(Arc::new(SystemClock));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
