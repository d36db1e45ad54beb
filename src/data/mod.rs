//! Data layer: records, the view engine, and its supporting algorithms.
//!
//! The pipeline is one-directional: collection -> filter -> sort ->
//! paginate. Export operates on the filtered, pre-sort subset.

pub mod field_path;
pub mod record;
pub mod record_exporter;
pub mod record_filter;
pub mod record_loaders;
pub mod table_view;
pub mod value_compare;
