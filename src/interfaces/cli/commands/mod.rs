//! CLI command implementations

mod config_gen;
mod reset_password;

pub use config_gen::config_generate;
pub use reset_password::run_reset_password;
