//! Lazy, reload-proof resource references
//!
//! A [`Handle`] is what long-lived code should keep instead of the resource
//! itself. It fetches the resource on first use and, after the manager is
//! disposed, fetches it again (possibly from a new root) the next time it is
//! asked. Clones of a handle share one state, and the manager hands out that
//! same state for as long as any clone is alive.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::manager::ResourceManager;
use super::resource_set::ResourceSet;
use super::resource_type::ResourceType;

pub(crate) struct HandleState<T: ResourceType> {
    manager: ResourceManager,
    set: Rc<ResourceSet<T>>,
    namespace: String,
    name: String,
    loaded: Cell<bool>,
    value: RefCell<Option<Rc<T::Resource>>>,
}

impl<T: ResourceType> HandleState<T> {
    pub(crate) fn invalidate(&self) {
        self.loaded.set(false);
        self.value.borrow_mut().take();
    }
}

/// A lazily loading reference to one (type, namespace, name) resource.
pub struct Handle<T: ResourceType> {
    state: Rc<HandleState<T>>,
}

impl<T: ResourceType> Handle<T> {
    pub(crate) fn new(
        manager: ResourceManager,
        set: Rc<ResourceSet<T>>,
        namespace: &str,
        name: &str,
    ) -> Self {
        Handle {
            state: Rc::new(HandleState {
                manager,
                set,
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                loaded: Cell::new(false),
                value: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn from_state(state: Rc<HandleState<T>>) -> Self {
        Handle { state }
    }

    pub(crate) fn downgrade(&self) -> Weak<HandleState<T>> {
        Rc::downgrade(&self.state)
    }

    /// The manager this handle was obtained from.
    pub fn manager(&self) -> &ResourceManager {
        &self.state.manager
    }

    pub fn resource_type(&self) -> &Rc<T> {
        self.state.set.resource_type()
    }

    pub fn namespace(&self) -> &str {
        &self.state.namespace
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Whether the resource has been fetched since the last dispose.
    pub fn is_loaded(&self) -> bool {
        self.state.loaded.get()
    }

    /// Fetch the resource now if it isn't already. Returns `self` for chaining.
    pub fn load(&self) -> &Self {
        if !self.state.loaded.get() {
            let state = &self.state;
            let value = state.set.get(&state.manager, &state.namespace, &state.name);
            *state.value.borrow_mut() = value;
            state.loaded.set(true);
        }
        self
    }

    /// The referenced resource, loading it on first access.
    ///
    /// `None` only when the load failed and the type has no fallback.
    pub fn get(&self) -> Option<Rc<T::Resource>> {
        self.load();
        self.state.value.borrow().clone()
    }

    /// Whether two handles share the same state.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.state, &other.state)
    }
}

impl<T: ResourceType> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: ResourceType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type", &self.state.set.resource_type().type_name())
            .field("namespace", &self.state.namespace)
            .field("name", &self.state.name)
            .field("loaded", &self.state.loaded.get())
            .finish()
    }
}
