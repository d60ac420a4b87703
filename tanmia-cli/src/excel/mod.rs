//! Spreadsheet import/export for the project registry

pub mod export;
pub mod headers;
pub mod import;
pub mod normalize;
pub mod template;

pub use export::{export_projects, export_rates};
pub use import::{ImportReport, import_projects};
pub use template::write_import_template;
