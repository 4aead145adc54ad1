//! Minified projections
//!
//! A minified shape carries a subset of a transfer object's fields. The
//! mapping is spelled out once per pair of types with [`project_fields!`]:
//!
//! ```
//! use recordkit_engine::{project_fields, Projection};
//!
//! #[derive(Debug, Clone, Default)]
//! struct WidgetDto {
//!     id: Option<u64>,
//!     name: String,
//!     color: String,
//!     notes: String,
//! }
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct WidgetSummary {
//!     id: Option<u64>,
//!     name: String,
//!     rank: u32,
//! }
//!
//! project_fields!(WidgetDto => WidgetSummary { id, name });
//!
//! let dto = WidgetDto {
//!     id: Some(3),
//!     name: "gear".into(),
//!     color: "red".into(),
//!     notes: String::new(),
//! };
//! let summary = WidgetSummary::project(&dto).unwrap();
//! assert_eq!(summary.id, Some(3));
//! assert_eq!(summary.name, "gear");
//! assert_eq!(summary.rank, 0);
//! ```
//!
//! Listed fields must exist on both types with the same type; a typo or a type
//! change fails to compile. Fields only the target has keep their `Default`
//! value. Nothing checks that the target's fields are all covered.

use crate::Result;

/// Build `Self` from a borrowed `S`
pub trait Projection<S>: Sized {
    /// Project `source` onto `Self`
    ///
    /// # Errors
    ///
    /// [`PersistError::Projection`](crate::PersistError::Projection) when the
    /// source cannot be represented.
    fn project(source: &S) -> Result<Self>;
}

/// Project every source, stopping at the first failure
///
/// # Errors
///
/// The first projection error.
pub fn project_all<S, T: Projection<S>>(sources: &[S]) -> Result<Vec<T>> {
    sources.iter().map(T::project).collect()
}

/// Implement [`Projection`] by cloning the listed fields
///
/// `project_fields!(Source => Target { a, b, c })` copies `a`, `b` and `c`
/// from `Source` and fills the rest of `Target` from `Default`.
#[macro_export]
macro_rules! project_fields {
    ($source:ty => $target:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Projection<$source> for $target {
            #[allow(clippy::needless_update)]
            fn project(source: &$source) -> $crate::Result<Self> {
                ::std::result::Result::Ok(Self {
                    $($field: ::std::clone::Clone::clone(&source.$field),)*
                    ..::std::default::Default::default()
                })
            }
        }
    };
}
