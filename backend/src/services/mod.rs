//! HTTP services, grouped by URL area. Each submodule exposes a
//! `configure_routes()` returning the Actix scope wired in `main.rs`.

use actix_web::HttpResponse;
use log::error;

use crate::render;

pub mod contact;
pub mod datasets;
pub mod pages;

pub(crate) fn not_found_page(message: &str) -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(render::HTML)
        .body(render::not_found(message))
}

pub(crate) fn server_error_page(err: &str) -> HttpResponse {
    error!("request failed: {}", err);
    HttpResponse::InternalServerError()
        .content_type(render::HTML)
        .body(render::server_error())
}
