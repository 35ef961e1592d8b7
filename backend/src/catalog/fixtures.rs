//! Shared test data: a seeded catalog with the `covid19` dataset, a
//! hidden table, a dataset without a file manifest and a hidden
//! dataset.

use common::model::table::{Field, Table};
use tempfile::TempDir;

use super::store::CatalogStore;

fn field(name: &str, show: bool, obfuscate: bool, search: bool) -> Field {
    Field {
        name: name.to_string(),
        show_on_frontend: show,
        obfuscate,
        is_search_field: search,
    }
}

/// The `caso` table as a plain struct, for tests that do not need a
/// database.
pub fn caso_table() -> Table {
    Table {
        id: 1,
        dataset_id: 1,
        name: "caso".to_string(),
        hidden: false,
        fields: vec![
            field("city", true, false, false),
            field("document", true, true, false),
            field("internal_notes", false, false, false),
            field("search_data", true, false, true),
        ],
    }
}

pub fn seeded_store() -> (TempDir, CatalogStore) {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path().join("catalog.sqlite"));
    store.ensure_schema().unwrap();
    let conn = store.open().unwrap();
    conn.execute_batch(
        "
        INSERT INTO dataset (id, slug, name, description, show, files_url) VALUES
            (1, 'covid19', 'COVID-19', 'Daily covid cases per city', 1,
             'https://data.catalog.local/covid19/'),
            (2, 'airports', 'Airports', 'Brazilian airports', 1, NULL),
            (3, 'balneabilidade', 'Balneabilidade', 'Beach water quality', 1, NULL),
            (4, 'internal', 'Internal', 'Not public', 0, NULL);
        INSERT INTO table_def (id, dataset_id, name, hidden, is_default, position) VALUES
            (1, 1, 'caso', 0, 1, 0),
            (2, 1, 'secret', 1, 0, 1),
            (3, 2, 'airports', 0, 1, 0);
        INSERT INTO field (table_id, name, show_on_frontend, obfuscate, is_search_field, position) VALUES
            (1, 'city', 1, 0, 0, 0),
            (1, 'document', 1, 1, 0, 1),
            (1, 'internal_notes', 0, 0, 0, 2),
            (1, 'search_data', 1, 0, 1, 3),
            (2, 'code', 1, 0, 0, 0),
            (3, 'iata', 1, 0, 0, 0);
        INSERT INTO version (dataset_id, name, ord, collected_at, download_url) VALUES
            (1, 'v1', 1, '2020-03-01', 'https://data.catalog.local/covid19/v1.zip'),
            (1, 'v2', 2, '2020-04-01', 'https://data.catalog.local/covid19/v2.zip'),
            (2, '2019', 1, '2019-01-01', 'https://data.catalog.local/airports/2019.zip');
        INSERT INTO file_manifest (dataset_id) VALUES (1), (3);
        INSERT INTO dataset_file (dataset_id, name, size, sha512, url) VALUES
            (1, 'caso.csv.gz', 1024, NULL,
             'https://data.catalog.local/covid19/caso.csv.gz');
        CREATE TABLE data_covid19_caso (
            city TEXT, document TEXT, internal_notes TEXT, search_data TEXT
        );
        INSERT INTO data_covid19_caso (city, document, internal_notes, search_data) VALUES
            ('Recife', '12345678901', 'note a', 'recife flu alpha'),
            ('Olinda', '98765432100', 'note b', 'olinda flu beta'),
            ('SaoPaulo', '11122233344', 'note c', 'saopaulo dengue gamma');
        CREATE TABLE data_covid19_secret (code TEXT);
        INSERT INTO data_covid19_secret (code) VALUES ('s1');
        ",
    )
    .unwrap();
    (dir, store)
}
