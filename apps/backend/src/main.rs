use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use backend::ai::{OpenAiClient, OpenAiConfig};
use backend::cors_middleware;
use backend::routes;
use backend::AppState;
use backend::GameConfig;
use backend::MemoryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    backend::telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: set via compose env_file or docker run --env-file
    // - Local dev: source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let openai_config = match OpenAiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    let ai = Arc::new(OpenAiClient::new(openai_config));

    let app_state = AppState::new(
        Arc::new(MemoryStore::new()),
        ai.clone(),
        ai,
        GameConfig::from_env(),
    );

    println!("🚀 Starting promptduel backend on http://{}:{}", host, port);

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
