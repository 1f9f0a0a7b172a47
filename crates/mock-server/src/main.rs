use anyhow::Context;
use clap::Parser;
use mock_server::{MockOptions, MockServer};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "inventory-mock", about = "In-memory inventory backend for local development")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "INVENTORY_MOCK_PORT", default_value_t = 3030)]
    port: u16,

    /// Load fixture exhibits, parts and jotforms at startup
    #[arg(long)]
    seed: bool,

    /// Do not add new parts to their exhibits' part lists
    #[arg(long)]
    no_link: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::logging::init_tracing(None);
    let args = Args::parse();

    let listener = TcpListener::bind(("127.0.0.1", args.port))
        .await
        .with_context(|| format!("failed to bind port {}", args.port))?;
    let server = MockServer::serve(
        listener,
        MockOptions {
            link_on_create: !args.no_link,
        },
    )
    .await?;
    if args.seed {
        server.seed().await;
    }

    info!(base_url = %server.base_url(), "Inventory mock backend ready");
    server.join().await;
    Ok(())
}
