//! The raised-error carrier and the declared error hierarchy.
//!
//! Rust has no runtime class hierarchy, so each dispatchable error type
//! declares its parent through [`ErrorLineage`]. The dispatcher walks that
//! declared chain from the most specific type to the root.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Descriptor of one error type in the dispatch hierarchy.
///
/// Equality and hashing use the [`TypeId`] only.
#[derive(Clone, Copy)]
pub struct ErrorType {
    /// Runtime identity of the concrete type.
    id: TypeId,
    /// Fully-qualified type name, for diagnostics.
    name: &'static str,
    /// Resolves the next, more general, type.
    parent: fn() -> Option<ErrorType>,
}

impl ErrorType {
    /// Returns the descriptor for `E`.
    pub fn of<E: ErrorLineage>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            parent: E::parent,
        }
    }

    /// Returns the runtime type identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully-qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared parent, or `None` for a root type.
    pub fn parent(&self) -> Option<ErrorType> {
        (self.parent)()
    }

    /// Iterates over this type followed by each successive parent.
    pub fn ancestry(&self) -> Ancestry {
        Ancestry {
            next: Some(*self),
            visited: Vec::new(),
        }
    }

    /// Returns whether `other` appears in this type's ancestry
    /// (including this type itself).
    pub fn is_a(&self, other: ErrorType) -> bool {
        self.ancestry().any(|ty| ty == other)
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErrorType {}

impl Hash for ErrorType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorType").field(&self.name).finish()
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over an error type and its declared ancestors, most specific
/// first.
#[derive(Debug)]
pub struct Ancestry {
    next: Option<ErrorType>,
    visited: Vec<TypeId>,
}

impl Iterator for Ancestry {
    type Item = ErrorType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        // Parent mappings are declared by hand and may loop.
        if self.visited.contains(&current.id) {
            return None;
        }
        self.visited.push(current.id);
        self.next = current.parent();
        Some(current)
    }
}

/// Places an error type in the dispatch hierarchy.
///
/// Implement directly, or use [`error_lineage!`](crate::error_lineage).
pub trait ErrorLineage: std::error::Error + Send + Sync + 'static {
    /// Returns the next, more general, error type. `None` marks a root.
    fn parent() -> Option<ErrorType>
    where
        Self: Sized,
    {
        None
    }
}

/// Object-safe view of an [`ErrorLineage`] value.
///
/// Blanket-implemented; never implement this by hand.
pub trait Raisable: std::error::Error + Send + Sync + 'static {
    /// Returns the concrete type's descriptor.
    fn error_type(&self) -> ErrorType;

    /// Returns `self` as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns `self` as a plain error trait object.
    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static);
}

impl<E: ErrorLineage> Raisable for E {
    fn error_type(&self) -> ErrorType {
        ErrorType::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
}

/// A raised error travelling through dispatch.
///
/// Clones share the same underlying error, so identity survives
/// re-raising, enqueueing, and logging.
#[derive(Clone)]
pub struct Raised(Arc<dyn Raisable>);

impl Raised {
    /// Wraps an error value.
    pub fn new<E: ErrorLineage>(error: E) -> Self {
        Self(Arc::new(error))
    }

    /// Returns the concrete error type.
    pub fn error_type(&self) -> ErrorType {
        self.0.error_type()
    }

    /// Returns the concrete error type name.
    pub fn type_name(&self) -> &'static str {
        self.error_type().name()
    }

    /// Returns the error's display message.
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    /// Returns whether the concrete type is exactly `E`.
    pub fn is<E: ErrorLineage>(&self) -> bool {
        self.0.as_any().is::<E>()
    }

    /// Returns whether `E` is the concrete type or one of its ancestors.
    pub fn is_a<E: ErrorLineage>(&self) -> bool {
        self.error_type().is_a(ErrorType::of::<E>())
    }

    /// Returns the concrete error if it is an `E`.
    pub fn downcast_ref<E: ErrorLineage>(&self) -> Option<&E> {
        self.0.as_any().downcast_ref::<E>()
    }

    /// Returns whether both handles refer to the same error instance.
    pub fn same_as(&self, other: &Raised) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }

    /// Returns the wrapped error as a trait object.
    pub fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_error()
    }
}

impl<E: ErrorLineage> From<E> for Raised {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_error(), f)
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0.as_error(), f)
    }
}

impl std::error::Error for Raised {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Constructs a same-typed error carrying a replacement message.
///
/// Used by message-rewriting policies. Types that can keep the original
/// error as their cause override [`from_message_with_cause`]; the default
/// falls back to the message-only constructor.
///
/// [`from_message_with_cause`]: FromMessage::from_message_with_cause
pub trait FromMessage: ErrorLineage + Sized {
    /// Builds the error from a message alone.
    fn from_message(message: String) -> Self;

    /// Builds the error from a message and the error it replaces.
    fn from_message_with_cause(message: String, cause: Raised) -> Self {
        let _ = cause;
        Self::from_message(message)
    }
}
