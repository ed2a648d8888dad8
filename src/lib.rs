// Resource manager library
// Typed resource loading, caching and reloadable handles

pub mod cli;
pub mod config;
pub mod logging;
pub mod resource;

pub use cli::Cli;
pub use config::{LoggerPolicy, ManagerConfig};
pub use logging::LogLevel;
pub use resource::{Handle, ResourceError, ResourceManager, ResourceType};
