//! Commands module - service layer for policy update invocations

pub(crate) mod service;
mod update;

pub use service::PolicyUpdaterService;
pub use update::AppliedPolicy;
