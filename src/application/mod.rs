// Application layer: loads month files and turns them into reports.
// Clients (the CLI, tests) go through DashboardService only.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
