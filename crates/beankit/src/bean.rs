//! Bean capability traits.
//!
//! The `Bean` trait provides untyped, name-based property access to a
//! record. It is typically implemented via the derive macro `#[derive(Bean)]`,
//! which also implements `BeanClass` (the static descriptor source) and,
//! for types with an `#[bean(id)]` field, `Identified`.

use crate::{AccessResult, BeanRef, PropertyDescriptor, Shape, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Name-based read/write access to a record.
///
/// The trait is object-safe; the engine works with `&dyn Bean` so source and
/// destination of a copy can be unrelated types.
///
/// # Example
///
/// ```ignore
/// use beankit::{Bean, Value};
///
/// #[derive(Default, beankit::Bean)]
/// struct User {
///     name: String,
///     age: i32,
/// }
///
/// let mut user = User::default();
/// user.set("name", Value::from("Alice"))?;
/// assert_eq!(user.get("name")?, Value::from("Alice"));
/// ```
pub trait Bean: Any + Send + Sync {
    /// Name of the bean type, as used in declared types and errors.
    fn type_name(&self) -> &'static str;

    /// Cached property descriptors of this bean's type.
    fn shape(&self) -> Arc<Shape>;

    /// Read a top-level property.
    fn get(&self, name: &str) -> AccessResult<Value>;

    /// Write a top-level property.
    ///
    /// The value must already be assignable to the declared type; no
    /// conversion happens here.
    fn set(&mut self, name: &str, value: Value) -> AccessResult<()>;

    /// Read any property, ignoring its readable flag.
    ///
    /// Used where a bean is duplicated as a whole, such as deep cloning.
    fn get_raw(&self, name: &str) -> AccessResult<Value>;

    /// Write any property, ignoring its writable flag. Like [`Bean::set`],
    /// no conversion happens.
    fn set_raw(&mut self, name: &str, value: Value) -> AccessResult<()>;

    /// A default-initialized bean of the same type.
    fn new_default(&self) -> Box<dyn Bean>;

    /// Move this bean into a fresh shared handle.
    fn share(self: Box<Self>) -> BeanRef;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Bean {
    /// Returns true if the bean is of type `T`.
    #[inline]
    pub fn is<T: Bean>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Bean>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Bean>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Bean<{}>", self.type_name())
    }
}

/// Static side of a bean type.
///
/// `Default` is the default-construction capability used by reset, batch
/// copy and cloning.
pub trait BeanClass: Bean + Default + Sized {
    /// Name of the bean type.
    const TYPE_NAME: &'static str;

    /// Property descriptors in declaration order.
    ///
    /// Called once per type; use [`describe`](crate::describe) to get the
    /// cached shape.
    fn properties() -> Vec<PropertyDescriptor>;
}

/// Records with a stable identifier.
///
/// Identity-preserving operations read the id before a destructive copy
/// and write it back afterwards.
pub trait Identified {
    /// Identifier type.
    type Id: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> Self::Id;

    fn set_id(&mut self, id: Self::Id);
}
