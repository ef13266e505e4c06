//! Terminal client for the project collaboration room.
//!
//! Joins one project, prints presence and collaboration events, sends typed
//! lines as chat and slash commands as cursor / tool / selection / view /
//! design-update events. Automatically reconnects on disconnection (max 5
//! attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin atelier-client -- --project P1 --user-id u1 --name Alice
//! cargo run --bin atelier-client -- --project P1 --user-id u2 --name Bob --role client
//! ```

use atelier_client::{ClientConfig, ClientError, run_client};
use atelier_server::domain::{
    AvatarRef, DisplayName, Participant, ParticipantId, ProjectId, Role,
};
use atelier_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "atelier-client")]
#[command(about = "Terminal client for the project collaboration room", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, env = "ATELIER_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Project to join
    #[arg(long)]
    project: String,

    /// Participant id (the same user may join from several connections)
    #[arg(long)]
    user_id: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Role: client, designer or administrator
    #[arg(long, default_value = "designer")]
    role: String,

    /// Avatar reference (e.g. an image URL)
    #[arg(long)]
    avatar: Option<String>,
}

fn build_config(args: Args) -> Result<ClientConfig, ClientError> {
    let participant = Participant::new(
        ParticipantId::new(args.user_id)?,
        DisplayName::new(args.name)?,
        Role::try_from(args.role.as_str())?,
        args.avatar.map(AvatarRef::new).transpose()?,
    );
    Ok(ClientConfig {
        url: args.url,
        project_id: ProjectId::new(args.project)?,
        participant,
    })
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
