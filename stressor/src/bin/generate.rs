use stressor::config::GeneratorConfig;
use stressor::generator::Generator;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stressor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GeneratorConfig::from_env()?;
    info!(
        "Loaded configuration: base_url={}, interval={:?}, max_iterations={}",
        config.base_url, config.interval, config.max_iterations
    );
    if let Some(ref weights) = config.weights {
        info!("Scenario weights: {:?}", weights);
    }
    if let Some(seed) = config.seed {
        info!("Using fixed seed {}", seed);
    }

    let generator = Generator::from_config(&config)?;

    tokio::select! {
        result = generator.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping load generation");
        }
    }

    Ok(())
}
