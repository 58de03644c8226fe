//! Declaration macros for error lineages.

/// Declares the position of one or more error types in the dispatch
/// hierarchy.
///
/// A bare type is declared as a root; `Type => Parent` makes `Parent` the
/// next, more general, type consulted when no policy matches `Type`.
///
/// # Example
/// ```rust
/// use faultline_core::error_lineage;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("io failed")]
/// struct IoFault;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("disk full")]
/// struct DiskFull;
///
/// error_lineage! {
///     IoFault,
///     DiskFull => IoFault,
/// }
/// ```
#[macro_export]
macro_rules! error_lineage {
    (@one $ty:ty) => {
        impl $crate::raised::ErrorLineage for $ty {}
    };
    (@one $ty:ty => $parent:ty) => {
        impl $crate::raised::ErrorLineage for $ty {
            fn parent() -> ::core::option::Option<$crate::raised::ErrorType> {
                ::core::option::Option::Some($crate::raised::ErrorType::of::<$parent>())
            }
        }
    };
    ($($ty:ty $(=> $parent:ty)?),+ $(,)?) => {
        $( $crate::error_lineage!(@one $ty $(=> $parent)?); )+
    };
}
