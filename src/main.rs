use anyhow::Context;
use clap::Parser;
use tracing::info;

use cacerts_webhook::{
    cli::Cli, run_webhook_server, InjectionConfig, Injector, StartupError, WebhookState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let Some(server_config) = cli.server_config() else {
        eprintln!("--tls-cert and --tls-key required");
        std::process::exit(1);
    };

    let injector = Injector::new(InjectionConfig::default()).map_err(StartupError::Patch)?;
    info!(
        exempt = ?injector.config().exempt_namespaces,
        image = %injector.config().init_image,
        "loaded injection config"
    );

    run_webhook_server(&server_config, WebhookState::new(injector))
        .await
        .context("webhook server stopped")
}
