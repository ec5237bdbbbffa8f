// Copyright 2025 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identification.

use core::fmt;

/// Position of a property within its [`PropertySet`](crate::PropertySet).
///
/// Ids follow declaration order, so sorting by id sorts by declaration. The
/// u16 size keeps store entries compact.
///
/// # Example
///
/// ```rust
/// use tessel_property::PropertyId;
///
/// let id = PropertyId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a property id from its index.
    ///
    /// This is typically called by [`PropertySet::register`](crate::PropertySet::register)
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
