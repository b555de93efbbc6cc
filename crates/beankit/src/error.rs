//! Error types for beankit operations.
//!
//! Every error carries enough context (bean type, property path) to locate
//! the failure without a backtrace. "No value" on a read is not an error and
//! never appears here.

use crate::value::ValueType;
use crate::PropertyPath;
use thiserror::Error;

/// Result type alias for property access.
pub type AccessResult<T> = Result<T, PropertyAccessError>;

/// Result type alias for copy operations.
pub type CopyResult<T> = Result<T, BeanCopyError>;

/// Result type alias for clone operations.
pub type CloneResult<T> = Result<T, CloneError>;

/// A value could not be coerced into a declared type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    /// No converter is registered for the target type.
    #[error("no converter registered for {from} -> {to}")]
    NoConverter {
        /// Kind of the input value.
        from: &'static str,
        /// Requested target type.
        to: ValueType,
    },

    /// A converter exists but rejected the input.
    #[error("cannot convert {from} to {to}: {message}")]
    Invalid {
        /// Kind of the input value.
        from: &'static str,
        /// Requested target type.
        to: ValueType,
        /// What went wrong.
        message: String,
    },
}

impl ConversionError {
    /// Create a missing converter error.
    #[inline]
    pub fn no_converter(from: &'static str, to: ValueType) -> Self {
        ConversionError::NoConverter { from, to }
    }

    /// Create an invalid input error.
    #[inline]
    pub fn invalid(from: &'static str, to: ValueType, message: impl Into<String>) -> Self {
        ConversionError::Invalid {
            from,
            to,
            message: message.into(),
        }
    }
}

/// Failure to read or write a property path on a bean.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PropertyAccessError {
    /// The path expression does not follow the path grammar.
    #[error("malformed property path `{path}`: {reason}")]
    MalformedPath {
        /// The offending expression.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A step names a property the bean does not have.
    #[error("unknown property `{path}` on {bean}")]
    UnknownProperty {
        /// Bean type name.
        bean: &'static str,
        /// Path to the property.
        path: String,
    },

    /// The property exists but has no reader.
    #[error("property `{path}` on {bean} is not readable")]
    NotReadable {
        /// Bean type name.
        bean: &'static str,
        /// Path to the property.
        path: String,
    },

    /// The property exists but has no writer.
    #[error("property `{path}` on {bean} is not writable")]
    NotWritable {
        /// Bean type name.
        bean: &'static str,
        /// Path to the property.
        path: String,
    },

    /// Indexed write past the end of a list.
    #[error("index {index} out of bounds (len: {len}) at `{path}` on {bean}")]
    IndexOutOfBounds {
        /// Bean type name.
        bean: &'static str,
        /// Path to the list element.
        path: String,
        /// The index that was accessed.
        index: usize,
        /// The actual length of the list.
        len: usize,
    },

    /// A write needs a container (bean, list or map) that is absent.
    #[error("no container at `{path}` on {bean}")]
    MissingContainer {
        /// Bean type name.
        bean: &'static str,
        /// Path whose container is absent.
        path: String,
    },

    /// A step found a value of the wrong shape (e.g. indexing a map).
    #[error("type mismatch at `{path}` on {bean}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Bean type name.
        bean: &'static str,
        /// Path where the mismatch occurred.
        path: String,
        /// The expected value kind.
        expected: &'static str,
        /// The actual value kind.
        found: &'static str,
    },

    /// The assigned value could not be converted to the declared type.
    #[error("cannot assign to `{path}` on {bean}: {source}")]
    Conversion {
        /// Bean type name.
        bean: &'static str,
        /// Path to the property.
        path: String,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },
}

impl PropertyAccessError {
    /// Create a malformed path error.
    #[inline]
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        PropertyAccessError::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown property error.
    #[inline]
    pub fn unknown_property(bean: &'static str, path: impl Into<String>) -> Self {
        PropertyAccessError::UnknownProperty {
            bean,
            path: path.into(),
        }
    }

    /// Create a not-readable error.
    #[inline]
    pub fn not_readable(bean: &'static str, path: impl Into<String>) -> Self {
        PropertyAccessError::NotReadable {
            bean,
            path: path.into(),
        }
    }

    /// Create a not-writable error.
    #[inline]
    pub fn not_writable(bean: &'static str, path: impl Into<String>) -> Self {
        PropertyAccessError::NotWritable {
            bean,
            path: path.into(),
        }
    }

    /// Create an index out of bounds error.
    #[inline]
    pub fn index_out_of_bounds(
        bean: &'static str,
        path: impl Into<String>,
        index: usize,
        len: usize,
    ) -> Self {
        PropertyAccessError::IndexOutOfBounds {
            bean,
            path: path.into(),
            index,
            len,
        }
    }

    /// Create a missing container error.
    #[inline]
    pub fn missing_container(bean: &'static str, path: impl Into<String>) -> Self {
        PropertyAccessError::MissingContainer {
            bean,
            path: path.into(),
        }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(
        bean: &'static str,
        path: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        PropertyAccessError::TypeMismatch {
            bean,
            path: path.into(),
            expected,
            found,
        }
    }

    /// Create a conversion error.
    #[inline]
    pub fn conversion(bean: &'static str, path: impl Into<String>, source: ConversionError) -> Self {
        PropertyAccessError::Conversion {
            bean,
            path: path.into(),
            source,
        }
    }

    /// Replace the bean type and path with the caller's view.
    ///
    /// Bean implementations only know the property name they were asked
    /// for; the resolver rewrites errors so they name the root bean and the
    /// whole path that was requested.
    pub fn in_context(self, root: &'static str, full: &PropertyPath) -> Self {
        let full = full.to_string();
        match self {
            PropertyAccessError::MalformedPath { .. } => self,
            PropertyAccessError::UnknownProperty { .. } => Self::unknown_property(root, full),
            PropertyAccessError::NotReadable { .. } => Self::not_readable(root, full),
            PropertyAccessError::NotWritable { .. } => Self::not_writable(root, full),
            PropertyAccessError::IndexOutOfBounds { index, len, .. } => {
                Self::index_out_of_bounds(root, full, index, len)
            }
            PropertyAccessError::MissingContainer { .. } => Self::missing_container(root, full),
            PropertyAccessError::TypeMismatch {
                expected, found, ..
            } => Self::type_mismatch(root, full, expected, found),
            PropertyAccessError::Conversion { source, .. } => Self::conversion(root, full, source),
        }
    }
}

/// Failure inside a copy operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BeanCopyError {
    /// Reading or writing one property failed.
    #[error("copying `{property}` from {from} to {to} failed")]
    Property {
        /// Source bean type.
        from: &'static str,
        /// Destination bean type.
        to: &'static str,
        /// Property (or path) being copied.
        property: String,
        /// Underlying access failure.
        #[source]
        source: PropertyAccessError,
    },

    /// A strict copy met a value that would need conversion.
    #[error("`{property}` on {to} requires conversion from {found} to {expected}")]
    ConversionRequired {
        /// Destination bean type.
        to: &'static str,
        /// Property being copied.
        property: String,
        /// Kind of the source value.
        found: &'static str,
        /// Declared destination type.
        expected: ValueType,
    },

    /// One item of a batch copy failed.
    #[error("batch copy failed at item {index}")]
    Batch {
        /// Position of the failing item.
        index: usize,
        /// Underlying failure.
        #[source]
        source: Box<BeanCopyError>,
    },
}

impl BeanCopyError {
    /// Wrap a property access failure.
    #[inline]
    pub fn property(
        from: &'static str,
        to: &'static str,
        property: impl Into<String>,
        source: PropertyAccessError,
    ) -> Self {
        BeanCopyError::Property {
            from,
            to,
            property: property.into(),
            source,
        }
    }

    /// Wrap a batch item failure.
    #[inline]
    pub fn batch(index: usize, source: BeanCopyError) -> Self {
        BeanCopyError::Batch {
            index,
            source: Box::new(source),
        }
    }
}

/// Failure while duplicating a bean graph.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CloneError {
    /// A reachable value cannot be duplicated (e.g. a resource handle).
    #[error("property `{property}` of {bean} holds {kind}, which cannot be duplicated")]
    Unclonable {
        /// Bean type owning the value.
        bean: &'static str,
        /// Property holding the value.
        property: String,
        /// Kind of the value.
        kind: &'static str,
    },

    /// Reading or writing a property of a node failed.
    #[error("cloning `{property}` of {bean} failed")]
    Property {
        /// Bean type being cloned.
        bean: &'static str,
        /// Property being cloned.
        property: String,
        /// Underlying access failure.
        #[source]
        source: PropertyAccessError,
    },

    /// The shallow copy step failed.
    #[error(transparent)]
    Copy(#[from] BeanCopyError),

    /// The duplicate does not have the requested type.
    #[error("clone produced {found}, expected {expected}")]
    TypeMismatch {
        /// Requested type.
        expected: &'static str,
        /// Produced type.
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PropertyAccessError::index_out_of_bounds("Order", "lines[3]", 3, 2);
        assert_eq!(
            err.to_string(),
            "index 3 out of bounds (len: 2) at `lines[3]` on Order"
        );
    }

    #[test]
    fn test_in_context_rewrites_path_and_bean() {
        let path: PropertyPath = "customer.address.city".parse().unwrap();
        let err = PropertyAccessError::unknown_property("Address", "city").in_context("Order", &path);
        assert_eq!(
            err,
            PropertyAccessError::unknown_property("Order", "customer.address.city")
        );
    }

    #[test]
    fn test_in_context_keeps_conversion_source() {
        let path: PropertyPath = "age".parse().unwrap();
        let source = ConversionError::no_converter("list", ValueType::Int);
        let err = PropertyAccessError::conversion("Person", "age", source.clone())
            .in_context("Person", &path);
        match err {
            PropertyAccessError::Conversion { source: inner, .. } => assert_eq!(inner, source),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_copy_error_preserves_cause() {
        use std::error::Error as _;

        let cause = PropertyAccessError::not_writable("Person", "id");
        let err = BeanCopyError::property("Person", "Person", "id", cause.clone());
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), cause.to_string());
    }
}
