use actix_web::{web, HttpResponse};
use common::requests::ContactForm;

use crate::config::AppConfig;
use crate::mailer::{Mailer, OutgoingEmail};
use crate::render;
use crate::services::server_error_page;

/// `POST /contact`. Invalid input re-renders the form with the
/// problem; a valid message is mailed to the configured address with
/// the sender as reply-to, then the client is redirected so a reload
/// cannot double-send.
pub async fn process(
    form: web::Form<ContactForm>,
    config: web::Data<AppConfig>,
    mailer: web::Data<dyn Mailer>,
) -> HttpResponse {
    let form = form.into_inner();
    if let Err(message) = form.validate() {
        return HttpResponse::Ok()
            .content_type(render::HTML)
            .body(render::contact_page(&form, Some(&message), false));
    }

    let email = OutgoingEmail {
        subject: format!("Contact form: {}", form.name),
        body: form.message.clone(),
        from: format!(
            "{} (via catalog) <{}>",
            form.name, config.default_from_email
        ),
        to: config.default_from_email.clone(),
        reply_to: Some(format!("{} <{}>", form.name, form.email)),
    };

    match mailer.send(&email) {
        Ok(()) => HttpResponse::Found()
            .insert_header(("Location", "/contact?sent=true"))
            .finish(),
        Err(e) => server_error_page(&e),
    }
}
