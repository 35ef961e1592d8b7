//! Contact form: `GET /contact` renders the form (pre-filled from
//! upstream-auth headers when present), `POST /contact` validates it
//! and hands the message to the [`crate::mailer::Mailer`]; every other
//! method gets the themed 405 page.

use actix_web::web::{get, post, resource, route, scope};
use actix_web::{HttpResponse, Scope};

use crate::render;

mod form;
mod submit;

const API_PATH: &str = "/contact";

pub fn configure_routes() -> Scope {
    scope(API_PATH).service(
        resource("")
            .route(get().to(form::process))
            .route(post().to(submit::process))
            // Anything but GET/POST gets the themed 405 page.
            .default_service(route().to(method_not_allowed)),
    )
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .content_type(render::HTML)
        .body(render::error_4xx("Invalid HTTP method."))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::dev::ServiceResponse;
    use actix_web::{test, web, App};
    use common::requests::ContactForm;

    use crate::config::AppConfig;
    use crate::mailer::testing::RecordingMailer;
    use crate::mailer::Mailer;

    async fn call(mailer: Arc<RecordingMailer>, req: test::TestRequest) -> ServiceResponse {
        let as_mailer: Arc<dyn Mailer> = mailer;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppConfig::default()))
                .app_data(web::Data::from(as_mailer))
                .service(super::configure_routes()),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn get_renders_form_and_prefills_from_auth_headers() {
        let mailer = Arc::new(RecordingMailer::default());
        let resp = call(mailer.clone(), test::TestRequest::get().uri("/contact")).await;
        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("<form method=\"post\""));

        let resp = call(
            mailer,
            test::TestRequest::get()
                .uri("/contact?sent=true")
                .insert_header(("X-Authenticated-Name", "Ana"))
                .insert_header(("X-Authenticated-Email", "ana@example.com")),
        )
        .await;
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Your message was sent."));
        assert!(body.contains("value=\"Ana\""));
        assert!(body.contains("value=\"ana@example.com\""));
    }

    #[actix_web::test]
    async fn valid_post_sends_mail_and_redirects() {
        let mailer = Arc::new(RecordingMailer::default());
        let resp = call(
            mailer.clone(),
            test::TestRequest::post().uri("/contact").set_form(ContactForm {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                message: "Hello there".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.status(), 302);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "/contact?sent=true"
        );

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("Ana"));
        assert_eq!(
            sent[0].reply_to.as_deref(),
            Some("Ana <ana@example.com>")
        );
        assert_eq!(sent[0].body, "Hello there");
    }

    #[actix_web::test]
    async fn invalid_post_rerenders_with_error_and_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let resp = call(
            mailer.clone(),
            test::TestRequest::post().uri("/contact").set_form(ContactForm {
                name: "Ana".to_string(),
                email: "not-an-address".to_string(),
                message: "Hello".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("A valid email is required."));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn name_with_line_breaks_never_reaches_the_mailer() {
        let mailer = Arc::new(RecordingMailer::default());
        let resp = call(
            mailer.clone(),
            test::TestRequest::post().uri("/contact").set_form(ContactForm {
                name: "Ana\r\nBcc: victim@example.com".to_string(),
                email: "ana@example.com".to_string(),
                message: "Hello".to_string(),
            }),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Name must not contain line breaks."));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn other_methods_get_the_405_page() {
        let mailer = Arc::new(RecordingMailer::default());
        let resp = call(mailer, test::TestRequest::put().uri("/contact")).await;
        assert_eq!(resp.status(), 405);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Invalid HTTP method."));
    }
}
