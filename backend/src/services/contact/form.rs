use std::collections::BTreeMap;

use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::ContactForm;

use crate::render;

/// `GET /contact`. When an upstream auth proxy identifies the caller
/// via `X-Authenticated-Name` / `X-Authenticated-Email`, those values
/// pre-fill the form.
pub async fn process(
    req: HttpRequest,
    query: web::Query<BTreeMap<String, String>>,
) -> HttpResponse {
    let sent = query
        .get("sent")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let form = ContactForm {
        name: header("X-Authenticated-Name"),
        email: header("X-Authenticated-Email"),
        message: String::new(),
    };

    HttpResponse::Ok()
        .content_type(render::HTML)
        .body(render::contact_page(&form, None, sent))
}
