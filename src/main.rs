use anyhow::Result;
use cert_secret_syncer::cli::Cli;
use cert_secret_syncer::config::load_config;
use cert_secret_syncer::runtime::initialization::initialize;
use cert_secret_syncer::runtime::watch_loop::run_watch_loop;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut controller_config, mut server_config, acm_config) = load_config();
    cli.apply(&mut controller_config, &mut server_config);

    let init_result = initialize(controller_config, &server_config, &acm_config).await?;

    run_watch_loop(
        init_result.secrets,
        init_result.reconciler,
        init_result.server_state,
    )
    .await
}
