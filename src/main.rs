use std::{env, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{anyhow, Context};
use embed_server::{configure, AppState, BertProvider, Config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    // rust-bert fetches weights with a blocking client, keep it off the runtime
    let source = config.model.clone();
    let provider = web::block(move || BertProvider::load(&source))
        .await
        .map_err(|err| anyhow!("model loading task failed: {err}"))?
        .context("Could not load model")?;

    let data = web::Data::new(AppState::new(Arc::new(provider)));
    let max_body = config.max_body;

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(configure(max_body))
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    tracing::info!(host = %config.host, port = config.port, "embedding server listening");
    server.bind(config.bind_addr())?.run().await?;
    Ok(())
}
