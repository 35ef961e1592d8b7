//! Catalog metadata and the dynamic table query layer.
//!
//! `store` resolves datasets, tables, versions and file manifests from
//! the metadata tables. `query` turns request parameters into composed
//! SQL over the per-table data tables and projects rows according to
//! each field's visibility flags.

pub mod query;
pub mod store;

#[cfg(test)]
pub mod fixtures;
