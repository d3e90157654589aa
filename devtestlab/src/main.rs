use devtestlab::api::{Client, DEFAULT_ENDPOINT};
use devtestlab::scenarios::Suite;
use devtestlab::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env()?;
    let endpoint = config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
    let client = Client::new(endpoint, &config.subscription_id, &config.access_token)?;

    let suite = Suite::new(client, &config);
    match suite.run().await {
        Ok(reports) => {
            for report in &reports {
                for outcome in &report.outcomes {
                    tracing::info!(
                        "{}: {} -> changed={}{}",
                        report.scenario,
                        outcome.step,
                        outcome.changed,
                        if outcome.dry_run { " (dry run)" } else { "" }
                    );
                }
                tracing::info!("scenario '{}' passed", report.scenario);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("contract violation: {}", e);
            std::process::exit(1);
        }
    }
}
