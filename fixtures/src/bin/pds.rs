use clap::Parser;
use fixtures::{
    pds::{router, PdsState},
    run_server, FixtureArgs,
};

/// PDS (Personal Data Server) fixture server
#[derive(Parser, Debug)]
#[clap(name = "pds-fixture")]
struct Cli {
    #[clap(flatten)]
    common: FixtureArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Avatars are served by this same process unless AVATAR_CDN_URL points elsewhere
    let addr = args.common.addr()?;
    let avatar_cdn_url =
        std::env::var("AVATAR_CDN_URL").unwrap_or_else(|_| format!("http://{addr}"));

    let app = router(PdsState::new(avatar_cdn_url));

    run_server(args.common, app).await
}
