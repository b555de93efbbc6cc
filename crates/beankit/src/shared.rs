//! Shared handles for nested beans and resources.
//!
//! Beans reference other beans through [`Shared<T>`], giving them reference
//! semantics: two parents holding clones of the same `Shared` see each
//! other's writes. Inside a [`Value`](crate::Value) the handle is type-erased
//! to a [`BeanRef`]. Identity is pointer identity in both forms.

use crate::{Bean, BeanClass, BeanType};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Typed shared handle to a bean.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wrap a value in a new handle.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Acquire a read lock.
    ///
    /// A poisoned lock is recovered: a panic in another holder cannot leave a
    /// bean half-assigned because every property write is a single store.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a write lock.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if both handles point at the same bean.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared allocation.
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T: BeanClass> Shared<T> {
    /// Type-erase this handle. The result points at the same bean.
    pub fn to_bean_ref(&self) -> BeanRef {
        let node: Arc<RwLock<dyn Bean>> = self.0.clone();
        BeanRef {
            node,
            typed: Arc::new(self.0.clone()),
            bean_type: BeanType::of::<T>(),
        }
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

thread_local! {
    // Handle pairs whose comparison is in progress on this thread.
    static COMPARING: RefCell<HashSet<(usize, usize)>> = RefCell::new(HashSet::new());
}

struct ComparingGuard((usize, usize));

impl Drop for ComparingGuard {
    fn drop(&mut self) {
        COMPARING.with(|active| active.borrow_mut().remove(&self.0));
    }
}

/// Compares the referenced beans by value.
///
/// A pair of handles reached again while it is still being compared counts
/// as equal, so two graphs with the same cycles compare equal instead of
/// recursing forever.
impl<T: PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.addr(), other.addr());
        if !COMPARING.with(|active| active.borrow_mut().insert(pair)) {
            return true;
        }
        let _guard = ComparingGuard(pair);
        *self.read() == *other.read()
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared<{}>@{:#x}", std::any::type_name::<T>(), self.addr())
    }
}

/// Type-erased shared handle to a bean.
#[derive(Clone)]
pub struct BeanRef {
    node: Arc<RwLock<dyn Bean>>,
    // `Arc<RwLock<T>>` of the concrete type, kept for downcasting.
    typed: Arc<dyn Any + Send + Sync>,
    bean_type: BeanType,
}

impl BeanRef {
    /// Bean type name, available without locking.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.bean_type.name()
    }

    #[inline]
    pub fn bean_type(&self) -> BeanType {
        self.bean_type
    }

    /// Acquire a read lock on the bean.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Bean> {
        self.node.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a write lock on the bean.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Bean> {
        self.node.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns true if both handles point at the same bean.
    #[inline]
    pub fn ptr_eq(&self, other: &BeanRef) -> bool {
        self.addr() == other.addr()
    }

    /// Address of the shared allocation; stable identity for graph walks.
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.node) as *const () as usize
    }

    /// Recover the typed handle.
    pub fn downcast<T: BeanClass>(&self) -> Option<Shared<T>> {
        self.typed
            .downcast_ref::<Arc<RwLock<T>>>()
            .map(|node| Shared(node.clone()))
    }
}

impl fmt::Debug for BeanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeanRef<{}>@{:#x}", self.bean_type, self.addr())
    }
}

/// Shared handle to a value that the engine must never duplicate, such as
/// an open file or a connection.
///
/// Shallow copies share the handle; deep clones fail on it.
pub struct Resource<T>(Arc<T>);

impl<T: Any + Send + Sync> Resource<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn to_opaque_ref(&self) -> OpaqueRef {
        OpaqueRef {
            inner: self.0.clone(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl<T> std::ops::Deref for Resource<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Resources compare by identity.
impl<T> PartialEq for Resource<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource<{}>", std::any::type_name::<T>())
    }
}

/// Type-erased [`Resource`] stored in a [`Value`](crate::Value).
#[derive(Clone)]
pub struct OpaqueRef {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueRef {
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn ptr_eq(&self, other: &OpaqueRef) -> bool {
        Arc::as_ptr(&self.inner) as *const () == Arc::as_ptr(&other.inner) as *const ()
    }

    pub(crate) fn downcast<T: Any + Send + Sync>(&self) -> Option<Resource<T>> {
        self.inner.clone().downcast::<T>().ok().map(Resource)
    }
}

impl fmt::Debug for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueRef<{}>", self.type_name)
    }
}
