mod defaults;
mod error;
mod loader;
mod raw;

pub use error::ConfigError;
pub use loader::load_configuration;
pub use raw::{Config, ConfigRaw};
