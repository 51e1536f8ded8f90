use clap::Parser;
use color_eyre::eyre::WrapErr as _;
use tracing::info;

use pfp_fetch::{interruptible, setup::setup_tracing, Config, ProfileImageResolver};

/// Print the profile image URL of a Bluesky account
#[derive(Parser, Debug)]
#[command(name = "pfp-fetch", version)]
struct Cli {
    /// Handle to look up; bare names get the default domain appended
    #[arg(default_value = "devoxx.bsky.social")]
    handle: String,

    /// Skip the HEAD request that checks the image URL is reachable
    #[arg(long)]
    no_verify: bool,

    /// Base URL of the XRPC host, overriding BLUESKY_API_URL
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // A missing .env is fine, a malformed one is not
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).wrap_err("Failed to load .env file");
        }
    }

    let cli = Cli::parse();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> color_eyre::Result<()> {
    setup_tracing("pfp_fetch")?;

    let mut config = Config::from_env().wrap_err("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    info!("Using XRPC host {}", config.api_url);

    let resolver = ProfileImageResolver::new(config)?;

    let handle = &cli.handle;
    let lookup = resolver.get_profile_image(handle);
    let image_url = interruptible(lookup, tokio::signal::ctrl_c())
        .await
        .wrap_err_with(|| format!("Error fetching profile image for {handle}"))?;

    let Some(image_url) = image_url else {
        println!("No profile image found for handle: {handle}");
        return Ok(());
    };

    println!("Profile image URL: {image_url}");

    if cli.no_verify {
        return Ok(());
    }

    let check = resolver.check_image(&image_url);
    let status = interruptible(check, tokio::signal::ctrl_c())
        .await
        .wrap_err("Error checking profile image URL")?;

    if status == reqwest::StatusCode::OK {
        println!("Image URL is accessible");
    } else {
        println!("Image URL returned status code: {}", status.as_u16());
    }

    Ok(())
}
