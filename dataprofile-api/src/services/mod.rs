pub mod profile_service;
pub mod report_store;

pub use profile_service::{ProfileRun, ProfileService};
pub use report_store::ReportStore;
