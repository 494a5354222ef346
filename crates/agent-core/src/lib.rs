pub mod config;
pub mod error;
pub mod history;
pub mod record;

pub use config::AppConfig;
pub use error::{AnalyzerError, Result};
pub use history::load_records;
pub use record::{Action, Record};
