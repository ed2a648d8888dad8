//! Logging sinks for the resource manager
//!
//! The manager never surfaces load or dispose failures to its callers. It
//! reports them here instead and carries on with a fallback. Fatal conditions
//! are panics; they unwind straight through the manager and never reach a
//! logger, so even [`SilentLogger`] cannot swallow them.

use std::path::Path;

use super::resource_type::Resource;

/// Receives diagnostics from the resource manager.
pub trait ResourceLogger {
    /// A resource failed to load and its fallback was used instead.
    ///
    /// `path` is the full directory that was searched, `directory` the name
    /// given when the type was registered.
    fn warn_exception(
        &self,
        type_name: &str,
        path: &Path,
        directory: &str,
        namespace: &str,
        name: &str,
        error: &anyhow::Error,
    );

    /// Disposing all resources has started.
    fn log_dispose(&self);

    /// Releasing a cached resource failed.
    fn warn_dispose_exception(
        &self,
        type_name: &str,
        namespace: &str,
        name: &str,
        resource: &dyn Resource,
        error: &anyhow::Error,
    );
}

/// Logs nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLogger;

impl ResourceLogger for SilentLogger {
    fn warn_exception(&self, _: &str, _: &Path, _: &str, _: &str, _: &str, _: &anyhow::Error) {}

    fn log_dispose(&self) {}

    fn warn_dispose_exception(&self, _: &str, _: &str, _: &str, _: &dyn Resource, _: &anyhow::Error) {}
}

/// Reports through the `log` facade, one record per failure.
///
/// Nothing is printed unless the application installs a `log` backend
/// (`env_logger`, or [`logging::init`](crate::logging::init) in this crate).
/// Libraries that cannot rely on one should install their own
/// [`ResourceLogger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLogger;

impl ResourceLogger for ConsoleLogger {
    fn warn_exception(
        &self,
        type_name: &str,
        path: &Path,
        directory: &str,
        namespace: &str,
        name: &str,
        error: &anyhow::Error,
    ) {
        log::warn!(
            "Failed to load resource {}:{}\n- Type:      {}\n- Directory: {}\n- Path:      {}\n- Cause:     {:#}",
            namespace,
            name,
            type_name,
            directory,
            path.display(),
            error
        );
    }

    fn log_dispose(&self) {
        log::info!("Disposing resources");
    }

    fn warn_dispose_exception(
        &self,
        type_name: &str,
        namespace: &str,
        name: &str,
        resource: &dyn Resource,
        error: &anyhow::Error,
    ) {
        log::warn!(
            "Failed to dispose resource {}:{}\n- Type:     {}\n- Instance: {}\n- Cause:    {:#}",
            namespace,
            name,
            type_name,
            resource.describe(),
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_without_backend() {
        let error = anyhow::anyhow!("disk on fire");
        let resource = "payload".to_string();

        ConsoleLogger.warn_exception("text", Path::new("root/std/content"), "content", "std", "a", &error);
        ConsoleLogger.log_dispose();
        ConsoleLogger.warn_dispose_exception("text", "std", "a", &resource, &error);
    }

    #[test]
    fn test_silent_logger_is_a_sink() {
        let sink: &dyn ResourceLogger = &SilentLogger;
        sink.log_dispose();
        sink.warn_exception("text", Path::new("root"), "content", "std", "a", &anyhow::anyhow!("x"));
    }
}
