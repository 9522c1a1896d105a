use anyhow::Context;
use tracing_subscriber::EnvFilter;

use orbitview::ViewerConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = try_main() {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let config = ViewerConfig::default();
    let model = config.model.clone();

    orbitview::run(config)
        .with_context(|| format!("viewer stopped while showing {}", model.display()))
}
