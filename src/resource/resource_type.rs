// Resource Type Definitions
// Contracts for loaded resources and the strategies that produce them

use std::path::Path;

use super::manager::ResourceManager;

/// An in-memory value produced by loading a resource file.
///
/// The manager owns every cached resource until the next dispose, at which
/// point [`Resource::dispose`] is called exactly once. Implementations release
/// any externally-owned state there (native handles, GPU objects, ...).
pub trait Resource: 'static {
    /// Release external state held by this resource.
    fn dispose(&self) -> anyhow::Result<()>;

    /// Short description used in diagnostics.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl Resource for String {
    fn dispose(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("String({} bytes)", self.len())
    }
}

impl Resource for Vec<u8> {
    fn dispose(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Vec<u8>({} bytes)", self.len())
    }
}

/// A strategy describing how to load one kind of resource.
///
/// Types are registered with a [`ResourceManager`] as an `Rc<T>`; the `Rc`
/// allocation is the identity of the type, so two structurally equal values
/// are still two distinct types. A type should hold no per-resource state.
pub trait ResourceType: 'static {
    type Resource: Resource;

    /// Load `name` from `directory`, which is `<root>/<namespace>/<dir>`.
    ///
    /// Any error makes the manager log the failure and use
    /// [`create_fallback`](ResourceType::create_fallback) instead.
    fn load(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
        directory: &Path,
    ) -> anyhow::Result<Self::Resource>;

    /// Build a substitute after a failed load. Must not touch the disk.
    ///
    /// Returning `None` makes the failed key resolve to `None` until the next
    /// dispose.
    fn create_fallback(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Self::Resource>;

    /// Name shown in log output.
    fn type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
