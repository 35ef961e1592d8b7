pub mod dataset;
pub mod table;
pub mod version;
