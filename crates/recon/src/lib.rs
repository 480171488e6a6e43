//! `aiglist-recon`: AIG roster reconciliation engine.
//!
//! Pure engine crate: receives pre-extracted rows, returns reconciled
//! records, derived views and summary counters. No CLI or IO dependencies.

pub mod aggregate;
pub mod classify;
pub mod classroom;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod markdown;
pub mod matcher;
pub mod model;
pub mod name;
pub mod report;
pub mod source;

pub use classroom::{ClassroomInfo, ClassroomRoster, ClassroomSheet};
pub use config::RunConfig;
pub use engine::{reconcile, run};
pub use error::{IssueScope, ReconError, RowError, RowIssue};
pub use model::{
    AigFlags, Category, ClassroomRecord, IdentityKey, Origin, ReconInput, ReconciledRecord,
    SourceRecord, UnmatchedStudent,
};
pub use name::NameFormat;
pub use report::{ReconReport, ReportSummary, SheetReport};
pub use source::{DocxRow, PdfRow, SourceRoster};
