//! Query-string normalization and dynamic query composition.
//!
//! The pipeline is: [`normalize_querystring`] strips and validates the
//! pagination/format controls, [`parse_querystring`] translates what
//! remains into filters, a free-text search and an ordering against a
//! concrete table's field set, and [`compose_query`] turns that into a
//! lazily-iterable SQL query over the table's backing data.

use std::collections::BTreeMap;

use common::model::table::{Field, Table};
use rusqlite::params_from_iter;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::util::obfuscate;

/// Hard ceiling on `items`, whatever the request asks for.
pub const MAX_ITEMS_PER_PAGE: i64 = 1000;

/// One projected row: visible field name paired with its rendered
/// value, in field-declaration order. The paginated view and the CSV
/// export both consume this shape, so they can never disagree.
pub type ProjectedRow = Vec<(String, String)>;

#[derive(Debug)]
pub struct PageParams {
    pub page: i64,
    pub items: i64,
    pub export_csv: bool,
    /// Remaining parameters, with empty-valued keys dropped. Used both
    /// for query translation and for rebuilding pagination links.
    pub filters: BTreeMap<String, String>,
}

/// Extracts `page`, `items` and `format` from the raw parameter set.
///
/// Blank values fall back to their defaults; non-numeric `page` or
/// `items` fail with a message the handler renders as a 404 page, and
/// `items` is clamped to [`MAX_ITEMS_PER_PAGE`].
pub fn normalize_querystring(
    mut raw: BTreeMap<String, String>,
    config: &AppConfig,
) -> Result<PageParams, String> {
    let page_raw = raw
        .remove("page")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "1".to_string());
    let items_raw = raw
        .remove("items")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.rows_per_page.to_string());
    let format = raw.remove("format").unwrap_or_default();

    let page: i64 = page_raw
        .parse()
        .map_err(|_| "Invalid page number.".to_string())?;
    let items: i64 = items_raw
        .parse()
        .map_err(|_| "Invalid items per page.".to_string())?;
    let items = items.clamp(1, MAX_ITEMS_PER_PAGE);

    raw.retain(|_, v| !v.trim().is_empty());

    Ok(PageParams {
        page,
        items,
        export_csv: format == "csv",
        filters: raw,
    })
}

/// Re-encodes the filter set for next/prev/download links.
pub fn echo_querystring(filters: &BTreeMap<String, String>) -> String {
    serde_urlencoded::to_string(filters).unwrap_or_default()
}

#[derive(Debug, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub value: String,
}

#[derive(Debug, PartialEq)]
pub struct OrderClause {
    pub field: String,
    pub desc: bool,
}

/// Structured form of the data-filter parameters for one table.
#[derive(Debug, Default)]
pub struct ParsedQuery {
    pub filters: Vec<FilterClause>,
    pub search_terms: Vec<String>,
    pub ordering: Vec<OrderClause>,
}

impl ParsedQuery {
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn has_search(&self) -> bool {
        !self.search_terms.is_empty()
    }
}

fn is_queryable(table: &Table, name: &str) -> bool {
    table
        .fields
        .iter()
        .any(|f| f.name == name && !f.is_search_field)
}

/// Translates the normalized filter parameters against a table.
///
/// `search` becomes whitespace-split free-text terms, `order-by` a
/// comma-separated ordering (`-` prefix for descending); every other
/// key that names a queryable field becomes an equality filter. Keys
/// that match nothing are ignored, so clients cannot reference columns
/// the table does not declare.
pub fn parse_querystring(params: &BTreeMap<String, String>, table: &Table) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();

    for (key, value) in params {
        match key.as_str() {
            "search" => {
                parsed.search_terms = value
                    .split_whitespace()
                    .map(|t| t.to_string())
                    .collect();
            }
            "order-by" => {
                for part in value.split(',') {
                    let part = part.trim();
                    let (name, desc) = match part.strip_prefix('-') {
                        Some(rest) => (rest, true),
                        None => (part, false),
                    };
                    if is_queryable(table, name) {
                        parsed.ordering.push(OrderClause {
                            field: name.to_string(),
                            desc,
                        });
                    }
                }
            }
            _ => {
                if is_queryable(table, key) {
                    parsed.filters.push(FilterClause {
                        field: key.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
    }

    parsed
}

/// A composed, parameterized query over one data table. Counting and
/// iteration are independent; iteration is always a lazy cursor.
#[derive(Debug)]
pub struct ComposedQuery {
    data_table: String,
    select_cols: Vec<String>,
    where_sql: String,
    params: Vec<String>,
    order_sql: String,
    pub has_filters: bool,
    pub has_search: bool,
}

/// Builds the SELECT for `table`'s visible columns from a parsed query.
/// Field names were validated during parsing; they are still quoted
/// here so odd-but-legal column names survive.
pub fn compose_query(data_table: &str, table: &Table, parsed: &ParsedQuery) -> ComposedQuery {
    let select_cols: Vec<String> = table
        .fields
        .iter()
        .filter(|f| f.visible())
        .map(|f| f.name.clone())
        .collect();

    let mut conditions = Vec::new();
    let mut params = Vec::new();
    for filter in &parsed.filters {
        conditions.push(format!("\"{}\" = ?", filter.field));
        params.push(filter.value.clone());
    }

    let search_col = table.fields.iter().find(|f| f.is_search_field);
    let mut has_search = false;
    if let Some(search_col) = search_col {
        for term in &parsed.search_terms {
            conditions.push(format!("\"{}\" LIKE ?", search_col.name));
            params.push(format!("%{}%", term));
            has_search = true;
        }
    }

    let where_sql = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let order_sql = if parsed.ordering.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = parsed
            .ordering
            .iter()
            .map(|o| {
                format!(
                    "\"{}\" {}",
                    o.field,
                    if o.desc { "DESC" } else { "ASC" }
                )
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    };

    ComposedQuery {
        data_table: data_table.to_string(),
        select_cols,
        where_sql,
        params,
        order_sql,
        has_filters: parsed.has_filters(),
        has_search,
    }
}

fn value_to_string(value: ValueRef) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(_) => String::new(),
    }
}

/// Reads one result row into the shared projection: visible fields
/// only, obfuscated fields masked. Column order matches `select_cols`.
fn project_row(row: &rusqlite::Row, fields: &[Field]) -> rusqlite::Result<ProjectedRow> {
    let mut out = Vec::new();
    for (idx, field) in fields.iter().filter(|f| f.visible()).enumerate() {
        let mut value = value_to_string(row.get_ref(idx)?);
        if field.obfuscate {
            value = obfuscate(&value);
        }
        out.push((field.name.clone(), value));
    }
    Ok(out)
}

impl ComposedQuery {
    fn select_sql(&self) -> String {
        let cols = if self.select_cols.is_empty() {
            "1".to_string()
        } else {
            self.select_cols
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "SELECT {} FROM \"{}\" {} {}",
            cols, self.data_table, self.where_sql, self.order_sql
        )
    }

    /// Total match count, independent of any pagination slice.
    pub fn count(&self, conn: &Connection) -> rusqlite::Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM \"{}\" {}",
            self.data_table, self.where_sql
        );
        conn.query_row(&sql, params_from_iter(&self.params), |row| row.get(0))
    }

    /// One page of projected rows. `limit`/`offset` are computed by the
    /// caller from a clamped page number.
    pub fn rows(
        &self,
        conn: &Connection,
        fields: &[Field],
        limit: i64,
        offset: i64,
    ) -> rusqlite::Result<Vec<ProjectedRow>> {
        let sql = format!("{} LIMIT {} OFFSET {}", self.select_sql(), limit, offset);
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(&self.params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(project_row(row, fields)?);
        }
        Ok(out)
    }

    /// Streams every matching row through `f` without materializing the
    /// result set. `f` returning an error stops iteration, which is how
    /// a disconnected export client cancels the cursor.
    pub fn for_each_row<F>(
        &self,
        conn: &Connection,
        fields: &[Field],
        mut f: F,
    ) -> Result<(), String>
    where
        F: FnMut(ProjectedRow) -> Result<(), String>,
    {
        let sql = self.select_sql();
        let mut stmt = conn.prepare(&sql).map_err(|e| e.to_string())?;
        let mut rows = stmt
            .query(params_from_iter(&self.params))
            .map_err(|e| e.to_string())?;
        loop {
            let row = match rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => return Err(e.to_string()),
            };
            let projected = project_row(row, fields).map_err(|e| e.to_string())?;
            f(projected)?;
        }
        Ok(())
    }
}

/// A clamped pagination window, Django-paginator style: out-of-range
/// page numbers land on the nearest valid page instead of failing.
#[derive(Debug, PartialEq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub offset: i64,
}

pub fn clamp_page(requested: i64, total: i64, items: i64) -> PageWindow {
    let num_pages = ((total + items - 1) / items).max(1);
    let number = requested.clamp(1, num_pages);
    PageWindow {
        number,
        num_pages,
        offset: (number - 1) * items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn normalize_applies_defaults() {
        let out = normalize_querystring(params(&[("city", "Recife")]), &config()).unwrap();
        assert_eq!(out.page, 1);
        assert_eq!(out.items, 20);
        assert!(!out.export_csv);
        assert_eq!(out.filters.get("city").unwrap(), "Recife");
    }

    #[test]
    fn normalize_treats_blank_controls_as_absent() {
        let out = normalize_querystring(params(&[("page", "  "), ("items", "")]), &config())
            .unwrap();
        assert_eq!(out.page, 1);
        assert_eq!(out.items, 20);
    }

    #[test]
    fn normalize_clamps_items_to_hard_ceiling() {
        let out = normalize_querystring(params(&[("items", "999999")]), &config()).unwrap();
        assert_eq!(out.items, MAX_ITEMS_PER_PAGE);
    }

    #[test]
    fn normalize_rejects_non_numeric_controls_with_messages() {
        let err = normalize_querystring(params(&[("page", "two")]), &config()).unwrap_err();
        assert_eq!(err, "Invalid page number.");
        let err = normalize_querystring(params(&[("items", "lots")]), &config()).unwrap_err();
        assert_eq!(err, "Invalid items per page.");
    }

    #[test]
    fn normalize_strips_controls_and_empty_values_from_filters() {
        let out = normalize_querystring(
            params(&[
                ("page", "2"),
                ("items", "50"),
                ("format", "csv"),
                ("city", "Recife"),
                ("state", ""),
            ]),
            &config(),
        )
        .unwrap();
        assert!(out.export_csv);
        assert_eq!(out.filters.len(), 1);
        assert_eq!(echo_querystring(&out.filters), "city=Recife");
    }

    #[test]
    fn format_must_be_exactly_csv() {
        let out = normalize_querystring(params(&[("format", "CSV")]), &config()).unwrap();
        assert!(!out.export_csv);
    }

    #[test]
    fn parse_maps_known_keys_and_ignores_unknown_ones() {
        let table = fixtures::caso_table();
        let parsed = parse_querystring(
            &params(&[("city", "Recife"), ("nope", "x"), ("search", "alpha beta")]),
            &table,
        );
        assert_eq!(
            parsed.filters,
            vec![FilterClause {
                field: "city".to_string(),
                value: "Recife".to_string()
            }]
        );
        assert_eq!(parsed.search_terms, vec!["alpha", "beta"]);
        assert!(parsed.has_filters());
        assert!(parsed.has_search());
    }

    #[test]
    fn parse_never_filters_or_orders_by_the_search_field() {
        let table = fixtures::caso_table();
        let parsed = parse_querystring(
            &params(&[("search_data", "x"), ("order-by", "search_data,-city")]),
            &table,
        );
        assert!(parsed.filters.is_empty());
        assert_eq!(
            parsed.ordering,
            vec![OrderClause {
                field: "city".to_string(),
                desc: true
            }]
        );
    }

    #[test]
    fn compose_builds_where_order_and_search_clauses() {
        let table = fixtures::caso_table();
        let parsed = parse_querystring(
            &params(&[("city", "Recife"), ("search", "flu"), ("order-by", "-city")]),
            &table,
        );
        let q = compose_query("data_covid19_caso", &table, &parsed);
        assert!(q.has_filters);
        assert!(q.has_search);
        let sql = q.select_sql();
        assert!(sql.contains("\"city\" = ?"));
        assert!(sql.contains("\"search_data\" LIKE ?"));
        assert!(sql.contains("ORDER BY \"city\" DESC"));
        assert!(sql.starts_with("SELECT \"city\", \"document\" FROM"));
        assert_eq!(q.params, vec!["Recife".to_string(), "%flu%".to_string()]);
    }

    #[test]
    fn projection_runs_against_real_rows() {
        let (dir, store) = fixtures::seeded_store();
        let conn = store.open().unwrap();
        let table = fixtures::caso_table();
        let parsed = parse_querystring(&params(&[("city", "Recife")]), &table);
        let q = compose_query("data_covid19_caso", &table, &parsed);

        assert_eq!(q.count(&conn).unwrap(), 1);
        let rows = q.rows(&conn, &table.fields, 10, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], ("city".to_string(), "Recife".to_string()));
        assert_eq!(rows[0][1].0, "document");
        assert!(rows[0][1].1.contains('*'));
        drop(conn);
        drop(dir);
    }

    #[test]
    fn for_each_row_stops_when_the_sink_errors() {
        let (dir, store) = fixtures::seeded_store();
        let conn = store.open().unwrap();
        let table = fixtures::caso_table();
        let q = compose_query("data_covid19_caso", &table, &ParsedQuery::default());

        let mut seen = 0;
        let result = q.for_each_row(&conn, &table.fields, |_| {
            seen += 1;
            Err("sink closed".to_string())
        });
        assert_eq!(result.unwrap_err(), "sink closed");
        assert_eq!(seen, 1);
        drop(conn);
        drop(dir);
    }

    #[test]
    fn clamp_page_lands_on_nearest_valid_page() {
        assert_eq!(
            clamp_page(5, 45, 20),
            PageWindow {
                number: 3,
                num_pages: 3,
                offset: 40
            }
        );
        assert_eq!(
            clamp_page(0, 45, 20),
            PageWindow {
                number: 1,
                num_pages: 3,
                offset: 0
            }
        );
        assert_eq!(clamp_page(1, 0, 20).num_pages, 1);
    }
}
