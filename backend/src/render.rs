//! Server-side HTML rendering.
//!
//! Pages are assembled from a shared layout plus per-page body
//! builders. Everything interpolated from the database or the request
//! goes through [`escape`].

use common::model::dataset::{Dataset, DatasetFile};
use common::model::table::{Field, Table};
use common::model::version::Version;
use common::requests::ContactForm;
use serde_json::Value;

use crate::catalog::query::ProjectedRow;

pub const HTML: &str = "text/html; charset=utf-8";

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} - Open Data Catalog</title>\n</head>\n<body>\n\
         <nav><a href=\"/home\">Home</a> | <a href=\"/dataset\">Datasets</a> | \
         <a href=\"/contact\">Contact</a></nav>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

pub fn not_found(message: &str) -> String {
    layout(
        "Not found",
        &format!("<h1>Not found</h1>\n<p>{}</p>", escape(message)),
    )
}

pub fn error_4xx(message: &str) -> String {
    layout(
        "Oops! Something went wrong",
        &format!(
            "<h1>Oops! Something went wrong:</h1>\n<p>{}</p>",
            escape(message)
        ),
    )
}

pub fn server_error() -> String {
    layout(
        "Internal error",
        "<h1>Internal error</h1>\n<p>Please try again later.</p>",
    )
}

/// Themed page for CSV exports rejected by the guard: points the caller
/// at the bulk download area instead.
pub fn csv_without_filters(download_url: Option<&str>) -> String {
    let hint = match download_url {
        Some(url) => format!(
            "<p>To download the full dataset, use the <a href=\"{}\">bulk files</a> instead.</p>",
            escape(url)
        ),
        None => String::new(),
    };
    layout(
        "Oops! Something went wrong",
        &format!(
            "<h1>Oops! Something went wrong:</h1>\n\
             <p>CSV downloads require explicit filters and a regular browser user-agent.</p>\n{}",
            hint
        ),
    )
}

fn dataset_cards(datasets: &[Dataset]) -> String {
    let mut out = String::from("<ul class=\"datasets\">\n");
    for ds in datasets {
        out.push_str(&format!(
            "<li><a href=\"/dataset/{slug}\">{name}</a><p>{desc}</p></li>\n",
            slug = escape(&ds.slug),
            name = escape(&ds.name),
            desc = escape(&ds.description),
        ));
    }
    out.push_str("</ul>\n");
    out
}

pub fn home_page(datasets: &[Dataset]) -> String {
    layout(
        "Home",
        &format!(
            "<h1>Open Data Catalog</h1>\n<h2>Some of our datasets</h2>\n{}",
            dataset_cards(datasets)
        ),
    )
}

pub fn dataset_list_page(datasets: &[Dataset], search: &str) -> String {
    layout(
        "Datasets",
        &format!(
            "<h1>Datasets</h1>\n\
             <form method=\"get\" action=\"/dataset\">\
             <input type=\"text\" name=\"search\" value=\"{}\">\
             <button type=\"submit\">Search</button></form>\n{}",
            escape(search),
            dataset_cards(datasets)
        ),
    )
}

pub struct DetailContext<'a> {
    pub dataset: &'a Dataset,
    pub table: &'a Table,
    pub version: Option<&'a Version>,
    pub fields: &'a [Field],
    pub rows: &'a [ProjectedRow],
    pub page: i64,
    pub num_pages: i64,
    pub total_count: i64,
    pub max_export_rows: i64,
    /// Filter/search params only, pagination and format stripped.
    pub querystring: &'a str,
}

pub fn dataset_detail_page(ctx: &DetailContext) -> String {
    let mut body = format!(
        "<h1>{name}</h1>\n<p>{desc}</p>\n<h2>Table: {table}</h2>\n",
        name = escape(&ctx.dataset.name),
        desc = escape(&ctx.dataset.description),
        table = escape(&ctx.table.name),
    );
    if let Some(version) = ctx.version {
        let collected = version.collected_at.as_deref().unwrap_or("-");
        body.push_str(&format!(
            "<p>Version {} (captured {})</p>\n",
            escape(&version.name),
            escape(collected)
        ));
    }
    body.push_str(&format!(
        "<p>{} rows in total (CSV export limited to {} rows)</p>\n",
        ctx.total_count, ctx.max_export_rows
    ));

    let sep = if ctx.querystring.is_empty() { "" } else { "&" };
    body.push_str(&format!(
        "<p><a href=\"?{qs}{sep}format=csv\">Download as CSV</a> | \
         <a href=\"/dataset/{slug}/files\">All files</a></p>\n",
        qs = escape(ctx.querystring),
        sep = sep,
        slug = escape(&ctx.dataset.slug),
    ));

    body.push_str("<table>\n<thead><tr>");
    for field in ctx.fields.iter().filter(|f| f.visible()) {
        body.push_str(&format!("<th>{}</th>", escape(&field.name)));
    }
    body.push_str("</tr></thead>\n<tbody>\n");
    for row in ctx.rows {
        body.push_str("<tr>");
        for (_, value) in row {
            body.push_str(&format!("<td>{}</td>", escape(value)));
        }
        body.push_str("</tr>\n");
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str("<p class=\"pagination\">");
    if ctx.page > 1 {
        body.push_str(&format!(
            "<a href=\"?{qs}{sep}page={p}\">Previous</a> ",
            qs = escape(ctx.querystring),
            sep = sep,
            p = ctx.page - 1
        ));
    }
    body.push_str(&format!("Page {} of {}", ctx.page, ctx.num_pages));
    if ctx.page < ctx.num_pages {
        body.push_str(&format!(
            " <a href=\"?{qs}{sep}page={p}\">Next</a>",
            qs = escape(ctx.querystring),
            sep = sep,
            p = ctx.page + 1
        ));
    }
    body.push_str("</p>\n");

    layout(&ctx.dataset.name, &body)
}

pub fn files_page(dataset: &Dataset, files: &[DatasetFile], version: Option<&Version>) -> String {
    let mut body = format!("<h1>{} - files</h1>\n", escape(&dataset.name));
    if let Some(version) = version {
        if let Some(collected) = &version.collected_at {
            body.push_str(&format!("<p>Captured {}</p>\n", escape(collected)));
        }
    }
    body.push_str("<ul>\n");
    for file in files {
        body.push_str(&format!(
            "<li><a href=\"{url}\">{name}</a> ({size} bytes)</li>\n",
            url = escape(&file.url),
            name = escape(&file.name),
            size = file.size,
        ));
    }
    body.push_str("</ul>\n");
    layout("Files", &body)
}

pub fn no_files_yet(slug: &str) -> String {
    layout(
        "No files yet",
        &format!(
            "<h1>No files yet</h1>\n\
             <p>We have not published downloadable files for the dataset {} yet.</p>\n\
             <p>We are working to make this data available soon.</p>",
            escape(slug)
        ),
    )
}

pub fn contact_page(form: &ContactForm, error: Option<&str>, sent: bool) -> String {
    let mut body = String::from("<h1>Contact</h1>\n");
    if sent {
        body.push_str("<p class=\"success\">Your message was sent. Thank you!</p>\n");
    }
    if let Some(error) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape(error)));
    }
    body.push_str(&format!(
        "<form method=\"post\" action=\"/contact\">\n\
         <label>Name <input type=\"text\" name=\"name\" value=\"{name}\"></label>\n\
         <label>Email <input type=\"email\" name=\"email\" value=\"{email}\"></label>\n\
         <label>Message <textarea name=\"message\">{message}</textarea></label>\n\
         <button type=\"submit\">Send</button>\n</form>\n",
        name = escape(&form.name),
        email = escape(&form.email),
        message = escape(&form.message),
    ));
    layout("Contact", &body)
}

pub fn contributors_page(data: &Value) -> String {
    let mut body = String::from("<h1>Contributors</h1>\n<ul>\n");
    if let Some(entries) = data.as_array() {
        for entry in entries {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_else(|| entry.as_str().unwrap_or("?"));
            body.push_str(&format!("<li>{}</li>\n", escape(name)));
        }
    }
    body.push_str("</ul>\n");
    layout("Contributors", &body)
}

pub fn manifesto_page() -> String {
    layout(
        "Manifesto",
        "<h1>Manifesto</h1>\n<p>Public data must be truly public: machine-readable, \
         documented and free to reuse.</p>",
    )
}

pub fn collaborate_page() -> String {
    layout(
        "Collaborate",
        "<h1>Collaborate</h1>\n<p>The catalog is built by volunteers. You can help by \
         cleaning data, writing crawlers or improving this site.</p>",
    )
}

pub fn dataset_suggestion_page() -> String {
    layout(
        "Suggest a dataset",
        "<h1>Suggest a dataset</h1>\n<p>Know a public data source we should liberate? \
         Tell us through the contact page.</p>",
    )
}
