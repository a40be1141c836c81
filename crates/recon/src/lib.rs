//! `packlist-recon` — packing list / code reference reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded datasets, returns the consolidated
//! table plus diagnostics. No CLI or file IO dependencies.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod schema;

pub use config::ReconConfig;
pub use dataset::{Cell, Column, Dataset};
pub use engine::reconcile;
pub use error::ReconError;
pub use model::{ConsolidatedRow, ConsolidatedTable, ReconOutcome, ReconResult, TableSummary};
pub use schema::{LogicalField, ResolvedSchema, SchemaMapping};
