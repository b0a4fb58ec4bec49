mod classifier;
mod config;
mod error;
mod handlers;
mod models;
mod template;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info, warn};

use crate::config::Config;
use crate::handlers::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    let model = classifier::load_model(&config.model_path);
    if model.is_none() {
        warn!("Serving without a model; predictions will report it as unavailable");
    }
    let state = web::Data::new(AppState::new(model));

    let bind_address = config.bind_address();
    info!("🌐 Server running at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
