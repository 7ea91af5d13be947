pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::OpenAiBackend;
pub use core::{
    etl::StaffingEngine, extract_matched_employees, pipeline::StaffingPipeline,
    post_process_response, reconcile,
};
pub use domain::model::{
    CustomizedCvStatus, MatchedEmployee, ReconcileOutcome, ReconciledDocument,
};
pub use utils::error::{Result, StaffingError};
