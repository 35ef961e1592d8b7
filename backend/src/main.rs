mod catalog;
mod config;
mod mailer;
mod render;
mod services;
mod traffic;
mod util;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;

use crate::catalog::store::CatalogStore;
use crate::config::AppConfig;
use crate::mailer::{Mailer, SpoolMailer};
use crate::util::JsonCache;

/// TTL for the cached contributors JSON.
const JSON_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();
    let store = CatalogStore::new(&config.database_path);
    store
        .ensure_schema()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mailer: Arc<dyn Mailer> = Arc::new(SpoolMailer::new(&config.mail_spool_dir));
    let json_cache = web::Data::new(JsonCache::new(JSON_CACHE_TTL));

    let bind_host = config.bind_host.clone();
    let bind_port = config.bind_port;
    info!("catalog serving on http://{}:{}", bind_host, bind_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::from(mailer.clone()))
            .app_data(json_cache.clone())
            .service(services::datasets::configure_routes())
            .service(services::contact::configure_routes())
            // The root scope goes last so /dataset and /contact win.
            .service(services::pages::configure_routes())
    })
    .bind((bind_host.as_str(), bind_port))?
    .run()
    .await
}
