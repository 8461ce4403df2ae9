mod config;
mod db;
mod error;
mod services;

use crate::config::Config;
use crate::db::Database;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load()?;
    let database = web::Data::new(Database::open(&config.database_path)?);
    info!("Using database at {}", config.database_path);

    let address = config.bind_address();
    let config = web::Data::new(config);

    info!("Server running at http://{}", address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(services::json_config(config.json_limit_bytes))
            .app_data(services::query_config())
            .app_data(database.clone())
            .app_data(config.clone())
            .service(services::upload::configure_routes())
            .service(services::ingest::configure_chunk_routes())
            .service(services::ingest::configure_routes())
            .service(services::records::configure_routes())
            .service(services::batches::configure_routes())
            .service(services::export::configure_routes())
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
