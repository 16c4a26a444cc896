//! Change detection for selected values.
//!
//! Bindings re-run their selector after every state change and only notify
//! the consumer when the new value is not the same as the one it already
//! has. "The same" means pointer identity for shared values and plain
//! equality for small owned values.

use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use std::rc::Rc;
use std::sync::Arc;

/// Cheap sameness check used to suppress redundant updates.
///
/// Implementations must be cheap: this runs once per selector per dispatch.
/// For `Arc<T>` it compares pointers, never contents.
pub trait Identity {
    /// Returns true if `other` should be treated as the same value
    fn is_same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for Rc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.is_same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identity, E: Identity> Identity for Result<T, E> {
    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Ok(a), Ok(b)) => a.is_same(b),
            (Err(a), Err(b)) => a.is_same(b),
            _ => false,
        }
    }
}

macro_rules! identity_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn is_same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_by_value!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    String,
    &'static str,
    NonZeroU32,
    NonZeroU64,
    NonZeroUsize,
);

// Bitwise, so a NaN result counts as unchanged
macro_rules! identity_by_bits {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn is_same(&self, other: &Self) -> bool {
                    self.to_bits() == other.to_bits()
                }
            }
        )*
    };
}

identity_by_bits!(f32, f64);

macro_rules! identity_for_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Identity),+> Identity for ($($name,)+) {
            fn is_same(&self, other: &Self) -> bool {
                $(self.$idx.is_same(&other.$idx))&&+
            }
        }
    };
}

identity_for_tuple!(A.0, B.1);
identity_for_tuple!(A.0, B.1, C.2);
identity_for_tuple!(A.0, B.1, C.2, D.3);
