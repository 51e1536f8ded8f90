use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod pds;

/// Common CLI arguments for all fixture servers
#[derive(Parser, Debug, Clone)]
pub struct FixtureArgs {
    /// The port to listen on
    #[arg(short, long, default_value = "3001")]
    pub port: u16,

    /// The host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
}

impl FixtureArgs {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        Ok(addr.parse::<SocketAddr>()?)
    }
}

/// Common function to run a fixture server
pub async fn run_server(args: FixtureArgs, app: Router) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let addr = args.addr()?;
    let app = app.layer(TraceLayer::new_for_http());

    info!("Fixture server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a router on an ephemeral localhost port from a background task.
///
/// `make_app` receives the bound address so handlers can build absolute URLs.
/// The server lives until the runtime shuts down.
pub async fn spawn_server<F>(make_app: F) -> anyhow::Result<SocketAddr>
where
    F: FnOnce(SocketAddr) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = make_app(addr);

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("Fixture server on {} stopped: {:?}", addr, err);
        }
    });

    Ok(addr)
}
