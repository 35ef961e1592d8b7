use actix_web::{web, HttpResponse};

use crate::catalog::store::CatalogStore;
use crate::render;
use crate::services::{not_found_page, server_error_page};

/// `GET /dataset/{slug}/files`.
///
/// Datasets without a file manifest redirect straight to the latest
/// version's download URL; a manifest with no entries renders the
/// themed "no files yet" page.
pub async fn process(path: web::Path<String>, store: web::Data<CatalogStore>) -> HttpResponse {
    let slug = path.into_inner();
    let dataset = match store.dataset(&slug) {
        Ok(Some(dataset)) => dataset,
        Ok(None) => return not_found_page("Dataset does not exist"),
        Err(e) => return server_error_page(&e),
    };

    match store.has_file_manifest(dataset.id) {
        Ok(true) => {}
        Ok(false) => {
            return match store.latest_version(dataset.id) {
                Ok(Some(version)) => match version.download_url {
                    Some(url) => HttpResponse::Found()
                        .insert_header(("Location", url))
                        .finish(),
                    None => HttpResponse::Ok()
                        .content_type(render::HTML)
                        .body(render::no_files_yet(&slug)),
                },
                Ok(None) => HttpResponse::Ok()
                    .content_type(render::HTML)
                    .body(render::no_files_yet(&slug)),
                Err(e) => server_error_page(&e),
            };
        }
        Err(e) => return server_error_page(&e),
    }

    let files = match store.files(dataset.id) {
        Ok(files) => files,
        Err(e) => return server_error_page(&e),
    };
    if files.is_empty() {
        return HttpResponse::Ok()
            .content_type(render::HTML)
            .body(render::no_files_yet(&slug));
    }

    let version = match store.latest_version(dataset.id) {
        Ok(version) => version,
        Err(e) => return server_error_page(&e),
    };
    HttpResponse::Ok()
        .content_type(render::HTML)
        .body(render::files_page(&dataset, &files, version.as_ref()))
}

#[cfg(test)]
mod tests {
    use actix_web::dev::ServiceResponse;
    use actix_web::{test, web, App};

    use crate::catalog::fixtures;
    use crate::catalog::store::CatalogStore;

    async fn get(store: &CatalogStore, uri: &str) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .service(crate::services::datasets::configure_routes()),
        )
        .await;
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await
    }

    #[actix_web::test]
    async fn manifest_listing_shows_files() {
        let (dir, store) = fixtures::seeded_store();
        let resp = get(&store, "/dataset/covid19/files").await;
        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("caso.csv.gz"));
        drop(dir);
    }

    #[actix_web::test]
    async fn missing_manifest_redirects_to_latest_version_dump() {
        let (dir, store) = fixtures::seeded_store();
        let resp = get(&store, "/dataset/airports/files").await;
        assert_eq!(resp.status(), 302);
        assert_eq!(
            resp.headers().get("Location").unwrap(),
            "https://data.catalog.local/airports/2019.zip"
        );
        drop(dir);
    }

    #[actix_web::test]
    async fn empty_manifest_renders_no_files_yet() {
        let (dir, store) = fixtures::seeded_store();
        let resp = get(&store, "/dataset/balneabilidade/files").await;
        assert_eq!(resp.status(), 200);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("No files yet"));
        drop(dir);
    }

    #[actix_web::test]
    async fn unknown_dataset_is_a_404() {
        let (dir, store) = fixtures::seeded_store();
        let resp = get(&store, "/dataset/nope/files").await;
        assert_eq!(resp.status(), 404);
        drop(dir);
    }
}
