//! Reporting core: pure aggregation over loosely-shaped sale records, a
//! bounded enrichment cache for display names, and the orchestration that
//! turns upstream pages into the typed report responses.

pub mod aggregate;
pub mod dto;
pub mod enrich;
pub mod error;
pub mod service;

pub use error::ReportError;
pub use service::ReportService;
