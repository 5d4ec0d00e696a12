pub mod configuration;
pub mod cookies;
pub mod download;
pub mod error;
pub mod models;
pub mod page;
pub mod panels;
pub mod run;
pub mod site;
pub mod storage;
#[cfg(test)]
mod test_log;

pub use configuration::{Context, Settings};
pub use error::ArchiveError;
pub use models::Cli;
pub use run::run;
