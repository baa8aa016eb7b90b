// Month file loading and validation, plus CSV/JSON export.

pub mod export;
pub mod loader;
pub mod validate;

pub use export::Exporter;
pub use loader::*;
pub use validate::*;
