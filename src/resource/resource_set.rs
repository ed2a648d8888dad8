// Resource Set
// Per-type cache: loaded resources plus weakly tracked handles

use std::any::Any;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::handle::{Handle, HandleState};
use super::manager::ResourceManager;
use super::resource_type::{Resource, ResourceType};

type Slots<V> = HashMap<String, HashMap<String, V>>;

/// Cache for every resource of one registered [`ResourceType`].
///
/// Resources are keyed by namespace, then name. A failed load caches the
/// fallback (possibly `None`) so each key is attempted at most once between
/// disposes. No borrow is held while the type's load strategy runs, which
/// lets strategies pull other resources through the manager.
pub(crate) struct ResourceSet<T: ResourceType> {
    resource_type: Rc<T>,
    directory: String,
    resources: RefCell<Slots<Option<Rc<T::Resource>>>>,
    handles: RefCell<Slots<Weak<HandleState<T>>>>,
}

impl<T: ResourceType> ResourceSet<T> {
    pub(crate) fn new(resource_type: Rc<T>, directory: String) -> Self {
        ResourceSet {
            resource_type,
            directory,
            resources: RefCell::new(HashMap::new()),
            handles: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn resource_type(&self) -> &Rc<T> {
        &self.resource_type
    }

    pub(crate) fn directory(&self) -> &str {
        &self.directory
    }

    /// Return the cached resource, loading it on first access.
    pub(crate) fn get(
        &self,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Option<Rc<T::Resource>> {
        if let Some(cached) = self.cached(namespace, name) {
            return cached;
        }

        let loaded = self.load(manager, namespace, name).map(Rc::new);

        // A strategy may have fetched this very key through the manager while
        // we were loading. The value cached first stays.
        let existing = {
            let mut resources = self.resources.borrow_mut();
            let names = resources.entry(namespace.to_owned()).or_default();
            match names.entry(name.to_owned()) {
                Entry::Occupied(entry) => Some(entry.get().clone()),
                Entry::Vacant(entry) => {
                    entry.insert(loaded.clone());
                    None
                }
            }
        };

        match existing {
            Some(existing) => {
                if let Some(redundant) = loaded {
                    self.release(manager, namespace, name, redundant.as_ref());
                }
                existing
            }
            None => loaded,
        }
    }

    /// Return the live handle for the key, or create one.
    pub(crate) fn handle(
        self: &Rc<Self>,
        manager: &ResourceManager,
        namespace: &str,
        name: &str,
    ) -> Handle<T> {
        let mut handles = self.handles.borrow_mut();
        let names = handles.entry(namespace.to_owned()).or_default();

        if let Some(state) = names.get(name).and_then(Weak::upgrade) {
            return Handle::from_state(state);
        }

        let handle = Handle::new(manager.clone(), Rc::clone(self), namespace, name);
        names.insert(name.to_owned(), handle.downgrade());
        handle
    }

    /// Number of cached entries, fallbacks included.
    pub(crate) fn cached_count(&self) -> usize {
        self.resources.borrow().values().map(HashMap::len).sum()
    }

    /// Number of handles that are still referenced somewhere.
    pub(crate) fn handle_count(&self) -> usize {
        self.handles
            .borrow()
            .values()
            .flat_map(HashMap::values)
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Handle table entries, dead ones included.
    #[cfg(test)]
    pub(crate) fn handle_entries(&self) -> usize {
        self.handles.borrow().values().map(HashMap::len).sum()
    }

    fn cached(&self, namespace: &str, name: &str) -> Option<Option<Rc<T::Resource>>> {
        self.resources
            .borrow()
            .get(namespace)
            .and_then(|names| names.get(name))
            .cloned()
    }

    fn load(&self, manager: &ResourceManager, namespace: &str, name: &str) -> Option<T::Resource> {
        let path = manager.root_path().join(namespace).join(&self.directory);
        log::trace!("Loading {}:{} from {}", namespace, name, path.display());

        match self.resource_type.load(manager, namespace, name, &path) {
            Ok(resource) => Some(resource),
            Err(err) => {
                manager.logger().warn_exception(
                    self.resource_type.type_name(),
                    &path,
                    &self.directory,
                    namespace,
                    name,
                    &err,
                );
                self.resource_type.create_fallback(manager, namespace, name)
            }
        }
    }

    fn release(&self, manager: &ResourceManager, namespace: &str, name: &str, resource: &T::Resource) {
        if let Err(err) = resource.dispose() {
            manager.logger().warn_dispose_exception(
                self.resource_type.type_name(),
                namespace,
                name,
                resource,
                &err,
            );
        }
    }
}

/// Type-erased view of a [`ResourceSet`], as stored by the manager.
pub(crate) trait AnyResourceSet {
    fn type_name(&self) -> &str;

    /// Release and evict every cached resource, then invalidate live handles.
    fn dispose(&self, manager: &ResourceManager);

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: ResourceType> AnyResourceSet for ResourceSet<T> {
    fn type_name(&self) -> &str {
        self.resource_type.type_name()
    }

    fn dispose(&self, manager: &ResourceManager) {
        // Taken out first so release hooks may call back into the manager.
        let resources = std::mem::take(&mut *self.resources.borrow_mut());
        for (namespace, names) in resources {
            for (name, resource) in names {
                if let Some(resource) = resource {
                    self.release(manager, &namespace, &name, resource.as_ref());
                }
            }
        }

        let live: Vec<Rc<HandleState<T>>> = {
            let mut handles = self.handles.borrow_mut();
            let mut live = Vec::new();
            handles.retain(|_, names| {
                names.retain(|_, weak| match weak.upgrade() {
                    Some(state) => {
                        live.push(state);
                        true
                    }
                    None => false,
                });
                !names.is_empty()
            });
            live
        };

        for state in live {
            state.invalidate();
        }
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
