//! Logical change events.
//!
//! A `ListChange` is what downstream consumers see: a payload together with
//! the kind of transition it went through.

use core::fmt;

/// The kind of transition a logical event reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeFlag {
    /// The value became present.
    Added,
    /// The value stopped being present.
    Removed,
    /// The value changed in place without changing membership.
    Updated,
}

impl fmt::Display for ChangeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeFlag::Added => write!(f, "ADDED"),
            ChangeFlag::Removed => write!(f, "REMOVED"),
            ChangeFlag::Updated => write!(f, "UPDATED"),
        }
    }
}

/// A classified change: a value and its flag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListChange<T> {
    value: T,
    flag: ChangeFlag,
}

impl<T> ListChange<T> {
    /// Creates a change with the given flag.
    #[inline]
    pub fn of(value: T, flag: ChangeFlag) -> Self {
        Self { value, flag }
    }

    #[inline]
    pub fn added(value: T) -> Self {
        Self::of(value, ChangeFlag::Added)
    }

    #[inline]
    pub fn removed(value: T) -> Self {
        Self::of(value, ChangeFlag::Removed)
    }

    #[inline]
    pub fn updated(value: T) -> Self {
        Self::of(value, ChangeFlag::Updated)
    }

    /// Returns a reference to the payload.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the flag.
    #[inline]
    pub fn flag(&self) -> ChangeFlag {
        self.flag
    }

    /// Consumes the change and returns the payload.
    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the payload, keeping the flag.
    #[inline]
    pub fn map<U, F>(self, f: F) -> ListChange<U>
    where
        F: FnOnce(T) -> U,
    {
        ListChange {
            value: f(self.value),
            flag: self.flag,
        }
    }
}

impl<T: fmt::Display> fmt::Display for ListChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.flag, self.value)
    }
}
