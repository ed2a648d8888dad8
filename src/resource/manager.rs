//! Resource manager - registry of resource types and their caches
//!
//! Resources live under `<root>/<namespace>/<directory>/`, where `directory`
//! is the name given when the type was registered. The manager loads them
//! lazily, caches them until the next [`ResourceManager::dispose`], and hands
//! out [`Handle`]s that survive a dispose.
//!
//! # Example
//! ```ignore
//! let manager = ResourceManager::new("assets", "game");
//! manager.register(&TEXT, "content")?;
//!
//! let greeting = manager.handle(&TEXT, None, "greeting")?;
//! println!("{:?}", greeting.get());
//!
//! // Switch to a different asset pack; `greeting` reloads on next use.
//! manager.dispose_with_root("assets-hd")?;
//! ```
//!
//! The manager is a cheap clone around shared state and is meant for a
//! single thread.

use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::error::{ResourceError, Result};
use super::handle::Handle;
use super::logger::{ConsoleLogger, ResourceLogger, SilentLogger};
use super::resource_set::{AnyResourceSet, ResourceSet};
use super::resource_type::ResourceType;

/// Identity of a registered type: the address of its `Rc` allocation.
///
/// The owning [`ResourceSet`] keeps that `Rc` alive, so the address cannot be
/// reused by another type while the registration exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TypeKey(usize);

impl TypeKey {
    fn of<T: ResourceType>(resource_type: &Rc<T>) -> Self {
        TypeKey(Rc::as_ptr(resource_type) as *const () as usize)
    }
}

struct ManagerInner {
    root: RefCell<PathBuf>,
    standard_namespace: String,
    logger: RefCell<Rc<dyn ResourceLogger>>,
    sets: RefCell<HashMap<TypeKey, Rc<dyn AnyResourceSet>>>,
}

/// Holder of every registered resource type and its cache.
#[derive(Clone)]
pub struct ResourceManager {
    inner: Rc<ManagerInner>,
}

impl ResourceManager {
    /// Create a manager rooted at `root`, using `standard_namespace` whenever
    /// a caller passes no namespace.
    ///
    /// Diagnostics go to [`ConsoleLogger`], which writes through the `log`
    /// facade and stays silent until a `log` backend is installed.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, standard_namespace: S) -> Self {
        ResourceManager {
            inner: Rc::new(ManagerInner {
                root: RefCell::new(root.into()),
                standard_namespace: standard_namespace.into(),
                logger: RefCell::new(Rc::new(ConsoleLogger)),
                sets: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The directory all resources are located under.
    pub fn root_path(&self) -> PathBuf {
        self.inner.root.borrow().clone()
    }

    pub fn standard_namespace(&self) -> &str {
        &self.inner.standard_namespace
    }

    /// Replace the logging sink. `None` silences logging entirely.
    pub fn set_logger(&self, logger: Option<Rc<dyn ResourceLogger>>) {
        let logger = logger.unwrap_or_else(|| Rc::new(SilentLogger));
        *self.inner.logger.borrow_mut() = logger;
    }

    pub fn logger(&self) -> Rc<dyn ResourceLogger> {
        Rc::clone(&self.inner.logger.borrow())
    }

    /// Register `resource_type`, storing its resources in `directory`.
    ///
    /// # Errors
    /// * `MissingArgument` - `directory` is empty
    /// * `DuplicateType` - this exact type is already registered
    pub fn register<T: ResourceType>(&self, resource_type: &Rc<T>, directory: &str) -> Result<()> {
        if directory.is_empty() {
            return Err(ResourceError::MissingArgument("directory"));
        }

        let mut sets = self.inner.sets.borrow_mut();
        match sets.entry(TypeKey::of(resource_type)) {
            Entry::Occupied(_) => Err(ResourceError::DuplicateType(
                resource_type.type_name().to_string(),
            )),
            Entry::Vacant(entry) => {
                log::debug!(
                    "Registered resource type {} in directory '{}'",
                    resource_type.type_name(),
                    directory
                );
                let set = ResourceSet::new(Rc::clone(resource_type), directory.to_owned());
                entry.insert(Rc::new(set));
                Ok(())
            }
        }
    }

    pub fn is_registered<T: ResourceType>(&self, resource_type: &Rc<T>) -> bool {
        self.inner
            .sets
            .borrow()
            .contains_key(&TypeKey::of(resource_type))
    }

    /// The directory a type was registered with.
    pub fn directory_of<T: ResourceType>(&self, resource_type: &Rc<T>) -> Result<String> {
        Ok(self.set_for(resource_type)?.directory().to_owned())
    }

    /// Get a resource, loading it on first access.
    ///
    /// `namespace` defaults to the standard namespace. A failed load is
    /// reported to the logger and replaced by the type's fallback, which is
    /// cached like a real result; `Ok(None)` means the fallback was absent.
    ///
    /// # Errors
    /// * `MissingArgument` - `name` is empty
    /// * `UnknownType` - the type was never registered
    pub fn get<T: ResourceType>(
        &self,
        resource_type: &Rc<T>,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<Rc<T::Resource>>> {
        let (set, namespace) = self.resolve(resource_type, namespace, name)?;
        Ok(set.get(self, namespace, name))
    }

    /// Get a handle to a resource without loading it.
    ///
    /// While any clone of a previously returned handle for the same key is
    /// alive, that same handle is returned again.
    ///
    /// # Errors
    /// Same as [`get`](ResourceManager::get).
    pub fn handle<T: ResourceType>(
        &self,
        resource_type: &Rc<T>,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Handle<T>> {
        let (set, namespace) = self.resolve(resource_type, namespace, name)?;
        Ok(set.handle(self, namespace, name))
    }

    /// Release and evict every cached resource, then invalidate all live
    /// handles so they reload on next access.
    ///
    /// Failures while releasing go to the logger; disposal always continues
    /// with the remaining resources.
    pub fn dispose(&self) {
        self.logger().log_dispose();

        let sets: Vec<Rc<dyn AnyResourceSet>> =
            self.inner.sets.borrow().values().cloned().collect();
        for set in sets {
            set.dispose(self);
        }
    }

    /// [`dispose`](ResourceManager::dispose), then switch to `new_root`.
    ///
    /// # Errors
    /// * `MissingArgument` - `new_root` is empty; nothing is disposed
    pub fn dispose_with_root<P: AsRef<Path>>(&self, new_root: P) -> Result<()> {
        let new_root = new_root.as_ref();
        if new_root.as_os_str().is_empty() {
            return Err(ResourceError::MissingArgument("root"));
        }

        self.dispose();
        *self.inner.root.borrow_mut() = new_root.to_path_buf();
        Ok(())
    }

    /// Number of cached entries for a type, fallbacks included.
    pub fn cached_count<T: ResourceType>(&self, resource_type: &Rc<T>) -> Result<usize> {
        Ok(self.set_for(resource_type)?.cached_count())
    }

    /// Number of handles for a type that are still referenced.
    pub fn handle_count<T: ResourceType>(&self, resource_type: &Rc<T>) -> Result<usize> {
        Ok(self.set_for(resource_type)?.handle_count())
    }

    #[cfg(test)]
    pub(crate) fn handle_entries<T: ResourceType>(&self, resource_type: &Rc<T>) -> usize {
        self.set_for(resource_type)
            .map(|set| set.handle_entries())
            .unwrap_or(0)
    }

    fn resolve<'a, T: ResourceType>(
        &'a self,
        resource_type: &Rc<T>,
        namespace: Option<&'a str>,
        name: &str,
    ) -> Result<(Rc<ResourceSet<T>>, &'a str)> {
        if name.is_empty() {
            return Err(ResourceError::MissingArgument("name"));
        }
        let namespace = namespace.unwrap_or(&self.inner.standard_namespace);
        Ok((self.set_for(resource_type)?, namespace))
    }

    fn set_for<T: ResourceType>(&self, resource_type: &Rc<T>) -> Result<Rc<ResourceSet<T>>> {
        let unknown = || ResourceError::UnknownType(resource_type.type_name().to_string());

        let set = self
            .inner
            .sets
            .borrow()
            .get(&TypeKey::of(resource_type))
            .cloned()
            .ok_or_else(unknown)?;

        set.into_any()
            .downcast::<ResourceSet<T>>()
            .map_err(|_| unknown())
    }
}

impl fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets = self.inner.sets.borrow();
        let types: Vec<&str> = sets.values().map(|set| set.type_name()).collect();
        f.debug_struct("ResourceManager")
            .field("root", &self.inner.root.borrow())
            .field("standard_namespace", &self.inner.standard_namespace)
            .field("types", &types)
            .finish()
    }
}
