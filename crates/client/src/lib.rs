pub mod config;
pub mod logging;
pub mod spectator;

pub use config::ClientConfig;
pub use logging::setup_logging;
pub use spectator::print_log;
