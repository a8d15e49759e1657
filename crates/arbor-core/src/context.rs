use std::any::{Any, TypeId};
use std::collections::BTreeMap;

/// Resources the embedding application hands to a bound tree (transforms, physics bodies,
/// navigation agents, trace sinks...).
///
/// The core makes no assumption about what is stored beyond presence checks: nodes look a
/// resource up by type and treat absence as a normal failure.
#[derive(Default)]
pub struct Context {
    resources: BTreeMap<TypeId, Box<dyn Any>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: 'static>(mut self, resource: T) -> Self {
        self.insert(resource);
        self
    }

    pub fn clear(&mut self) {
        self.resources.clear();
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.resources.contains_key(&TypeId::of::<T>())
    }

    /// Store `resource`, returning the previous one of the same type.
    pub fn insert<T: 'static>(&mut self, resource: T) -> Option<T> {
        let previous = self
            .resources
            .insert(TypeId::of::<T>(), Box::new(resource))?;
        previous.downcast::<T>().ok().map(|b| *b)
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.resources.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.resources.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        let value = self.resources.remove(&TypeId::of::<T>())?;
        value.downcast::<T>().ok().map(|b| *b)
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("resources", &self.resources.len())
            .finish()
    }
}
