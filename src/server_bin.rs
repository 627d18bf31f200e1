use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use battle_chess::combat::DiceOracle;
use battle_chess::oracle::{handlers::oracle_route, logic::Model, model::DEFAULT_MODEL, LocalModel};

#[allow(unused_imports)]
use log::{debug, error, info, trace, warn};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("It's oracle server!");

    let port: u16 = match env::args().nth(1) {
        Some(port) => port.parse().context("Port must be a number")?,
        None => 3030,
    };
    let model = model_from_env()?;
    warp::serve(oracle_route(model)).run(([0, 0, 0, 0], port)).await;
    Ok(())
}

/// `ORACLE_MODEL_URL` picks a local model server, otherwise the dice answer.
fn model_from_env() -> anyhow::Result<Model> {
    if let Ok(link) = env::var("ORACLE_MODEL_URL") {
        let base = Url::parse(&link).context("ORACLE_MODEL_URL is not a valid link")?;
        let name = env::var("ORACLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let model = LocalModel::new(&base, name.as_str()).context("Failed to build model endpoint")?;
        info!("Relaying prompts to {} at {}", name, model.endpoint());
        return Ok(Arc::new(model));
    }
    let latency = match env::var("ORACLE_LATENCY_MS") {
        Ok(value) => Duration::from_millis(
            value
                .parse()
                .context("ORACLE_LATENCY_MS must be a number of milliseconds")?,
        ),
        Err(_) => Duration::ZERO,
    };
    warn!("ORACLE_MODEL_URL is not set, fights are settled by dice");
    Ok(Arc::new(DiceOracle::new().with_latency(latency)))
}
