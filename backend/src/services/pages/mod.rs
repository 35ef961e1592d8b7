//! Informational pages and top-level redirects: home (with a random
//! sample of datasets), manifesto, collaborate, dataset suggestion,
//! the cached contributors list and the donate redirect.

use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Scope};

use crate::catalog::store::CatalogStore;
use crate::config::AppConfig;
use crate::render;
use crate::services::server_error_page;

mod contributors;

/// How many datasets the home page samples.
const HOME_SAMPLE: i64 = 6;

pub fn configure_routes() -> Scope {
    scope("")
        .route("/", get().to(index))
        .route("/home", get().to(home))
        .route("/manifesto", get().to(manifesto))
        .route("/collaborate", get().to(collaborate))
        .route("/dataset-suggestion", get().to(dataset_suggestion))
        .route("/contributors", get().to(contributors::process))
        .route("/donate", get().to(donate))
}

async fn index() -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", "/home"))
        .finish()
}

async fn home(store: web::Data<CatalogStore>) -> HttpResponse {
    match store.sample_datasets(HOME_SAMPLE) {
        Ok(datasets) => HttpResponse::Ok()
            .content_type(render::HTML)
            .body(render::home_page(&datasets)),
        Err(e) => server_error_page(&e),
    }
}

async fn donate(config: web::Data<AppConfig>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("Location", config.donate_url.clone()))
        .finish()
}

async fn manifesto() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(render::HTML)
        .body(render::manifesto_page())
}

async fn collaborate() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(render::HTML)
        .body(render::collaborate_page())
}

async fn dataset_suggestion() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(render::HTML)
        .body(render::dataset_suggestion_page())
}
