//! CLI command implementations

pub mod batch;
pub mod config;
pub mod health;
pub mod run;
pub mod stress;

pub use batch::batch_command;
pub use config::config_command;
pub use health::health_command;
pub use run::run_command;
pub use stress::stress_command;
