use actix_web::{web, HttpResponse};
use log::error;

use crate::config::AppConfig;
use crate::render;
use crate::util::JsonCache;

/// `GET /contributors`. The list lives on an external JSON endpoint
/// and is cached for five minutes by the shared [`JsonCache`].
pub async fn process(
    cache: web::Data<JsonCache>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    match cache.get_json(&config.contributors_url).await {
        Ok(data) => HttpResponse::Ok()
            .content_type(render::HTML)
            .body(render::contributors_page(&data)),
        Err(e) => {
            error!("contributors fetch failed: {}", e);
            HttpResponse::ServiceUnavailable()
                .content_type(render::HTML)
                .body(render::error_4xx("Could not load contributors right now."))
        }
    }
}
