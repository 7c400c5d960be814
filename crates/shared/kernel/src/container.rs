//! Typed dependency container.
//!
//! Services are bound under a key type `C` and resolved through a [`ServiceRef<T>`], where `T`
//! is the type handed back to callers (often a trait object). The reference is a plain value:
//! it can be stored, copied and resolved later against any container holding the binding.
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

#[dhub_derive::dhub_error]
pub enum ContainerError {
    /// Nothing is bound under the requested key.
    #[error("Unbound service{}: {message}", format_context(.context))]
    Unbound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The key is bound, but to a different service type.
    #[error("Service type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Typed reference to a binding keyed by a concrete type.
pub struct ServiceRef<T: ?Sized> {
    key: TypeId,
    name: &'static str,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + 'static> ServiceRef<T> {
    /// Reference to whatever is bound under the key type `C`.
    #[must_use]
    pub fn of<C: 'static>() -> Self {
        Self { key: TypeId::of::<C>(), name: type_name::<C>(), _marker: PhantomData }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.key
    }
}

impl<T: ?Sized> Clone for ServiceRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ServiceRef<T> {}

impl<T: ?Sized> PartialEq for ServiceRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T: ?Sized> Eq for ServiceRef<T> {}

impl<T: ?Sized> Hash for ServiceRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for ServiceRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceRef").field(&self.name).finish()
    }
}

type Factory<T> = Arc<dyn Fn(&Container) -> Result<Arc<T>, ContainerError> + Send + Sync>;

enum Binding<T: ?Sized> {
    Factory(Factory<T>),
    Singleton { factory: Factory<T>, cell: OnceLock<Arc<T>> },
    Instance(Arc<T>),
}

struct Entry {
    name: &'static str,
    binding: Arc<dyn Any + Send + Sync>,
}

/// Shared registry of service bindings. Clones share the same bindings.
#[derive(Clone, Default)]
pub struct Container {
    bindings: Arc<RwLock<FxHashMap<TypeId, Entry>>>,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a factory invoked on every resolution.
    pub fn bind<T, C>(
        &self,
        factory: impl Fn(&Self) -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    ) -> ServiceRef<T>
    where
        T: ?Sized + Send + Sync + 'static,
        C: 'static,
    {
        self.insert::<T, C>(Binding::Factory(Arc::new(factory)))
    }

    /// Binds a factory invoked once; later resolutions share the first instance.
    pub fn singleton<T, C>(
        &self,
        factory: impl Fn(&Self) -> Result<Arc<T>, ContainerError> + Send + Sync + 'static,
    ) -> ServiceRef<T>
    where
        T: ?Sized + Send + Sync + 'static,
        C: 'static,
    {
        let binding = Binding::Singleton { factory: Arc::new(factory), cell: OnceLock::new() };
        self.insert::<T, C>(binding)
    }

    /// Binds an already constructed instance.
    pub fn instance<T, C>(&self, instance: Arc<T>) -> ServiceRef<T>
    where
        T: ?Sized + Send + Sync + 'static,
        C: 'static,
    {
        self.insert::<T, C>(Binding::Instance(instance))
    }

    /// Resolves the live service behind `reference`.
    ///
    /// Factories run without the container lock held, so they may resolve their own
    /// dependencies.
    ///
    /// # Errors
    /// [`ContainerError::Unbound`] when nothing is bound under the reference's key,
    /// [`ContainerError::TypeMismatch`] when the binding produces another type, or any error
    /// raised by the factory.
    pub fn resolve<T>(&self, reference: &ServiceRef<T>) -> Result<Arc<T>, ContainerError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = self
            .bindings
            .read()
            .get(&reference.key)
            .map(|entry| Arc::clone(&entry.binding))
            .ok_or_else(|| ContainerError::Unbound {
                message: format!("no binding for {}", reference.name).into(),
                context: None,
            })?;

        let binding = binding.downcast_ref::<Binding<T>>().ok_or_else(|| {
            ContainerError::TypeMismatch {
                message: format!("{} is not bound as {}", reference.name, type_name::<T>())
                    .into(),
                context: None,
            }
        })?;

        trace!(service = reference.name, "Resolving service");

        match binding {
            Binding::Instance(instance) => Ok(Arc::clone(instance)),
            Binding::Factory(factory) => factory(self),
            Binding::Singleton { factory, cell } => {
                if let Some(existing) = cell.get() {
                    return Ok(Arc::clone(existing));
                }
                let created = factory(self)?;
                // A racing resolver may have won; keep whichever instance landed first.
                let _ = cell.set(Arc::clone(&created));
                Ok(cell.get().map_or(created, Arc::clone))
            },
        }
    }

    #[must_use]
    pub fn contains<T: ?Sized>(&self, reference: &ServiceRef<T>) -> bool {
        self.bindings.read().contains_key(&reference.key)
    }

    fn insert<T, C>(&self, binding: Binding<T>) -> ServiceRef<T>
    where
        T: ?Sized + Send + Sync + 'static,
        C: 'static,
    {
        let reference = ServiceRef::<T>::of::<C>();
        let replaced = self
            .bindings
            .write()
            .insert(reference.key, Entry { name: reference.name, binding: Arc::new(binding) })
            .is_some();

        debug!(service = reference.name, replaced, "Service bound");
        reference
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.read();
        let mut names: Vec<_> = bindings.values().map(|entry| entry.name).collect();
        names.sort_unstable();
        f.debug_struct("Container").field("bindings", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: fmt::Debug + Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Debug)]
    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_owned()
        }
    }

    #[derive(Debug)]
    struct Counter(usize);

    #[test]
    fn resolves_trait_objects_by_concrete_key() {
        let container = Container::new();
        let reference = container.instance::<dyn Greeter, English>(Arc::new(English));

        assert_eq!(reference, ServiceRef::<dyn Greeter>::of::<English>());
        assert_eq!(container.resolve(&reference).unwrap().greet(), "hello");
    }

    #[test]
    fn unbound_reference_fails() {
        let container = Container::new();
        let reference = ServiceRef::<dyn Greeter>::of::<English>();

        assert!(!container.contains(&reference));
        let err = container.resolve(&reference).unwrap_err();
        assert!(matches!(err, ContainerError::Unbound { .. }));
        assert!(err.to_string().contains("English"));
    }

    #[test]
    fn reference_of_wrong_service_type_is_a_mismatch() {
        let container = Container::new();
        container.instance::<dyn Greeter, English>(Arc::new(English));

        let err = container.resolve(&ServiceRef::<English>::of::<English>()).unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn factory_runs_per_resolution_and_singleton_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let container = Container::new();

        let seen = Arc::clone(&calls);
        let transient = container.bind::<Counter, Counter>(move |_| {
            Ok(Arc::new(Counter(seen.fetch_add(1, Ordering::SeqCst))))
        });
        assert_eq!(container.resolve(&transient).unwrap().0, 0);
        assert_eq!(container.resolve(&transient).unwrap().0, 1);

        struct Shared;
        let seen = Arc::clone(&calls);
        let shared = container.singleton::<Counter, Shared>(move |_| {
            Ok(Arc::new(Counter(seen.fetch_add(1, Ordering::SeqCst))))
        });
        let first = container.resolve(&shared).unwrap();
        let second = container.resolve(&shared).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn factories_can_resolve_dependencies() {
        let container = Container::new();
        let greeter = container.instance::<dyn Greeter, English>(Arc::new(English));

        struct Loud;
        let loud = container.bind::<String, Loud>(move |c| {
            Ok(Arc::new(c.resolve(&greeter)?.greet().to_uppercase()))
        });

        assert_eq!(container.resolve(&loud).unwrap().as_str(), "HELLO");
    }

    #[test]
    fn clones_share_bindings() {
        let container = Container::new();
        let clone = container.clone();
        let reference = clone.instance::<Counter, Counter>(Arc::new(Counter(7)));

        assert_eq!(container.resolve(&reference).unwrap().0, 7);
        assert!(format!("{container:?}").contains("Counter"));
    }
}
