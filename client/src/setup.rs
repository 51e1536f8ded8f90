use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Installs the global subscriber: `RUST_LOG` filtering (default `info` for
/// `crate_name`, `warn` elsewhere) rendered as an indented tree.
pub fn setup_tracing(crate_name: &str) -> color_eyre::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{crate_name}=info")));

    let tree_layer = HierarchicalLayer::new(2)
        .with_writer(std::io::stderr)
        .with_targets(true)
        .with_bracketed_fields(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tree_layer)
        .try_init()?;

    Ok(())
}
