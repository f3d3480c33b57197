//! The soft error channel.
//!
//! Misuse of an [`AdjustableArray`](crate::AdjustableArray) never interrupts control flow.
//! Each kind is recorded once in a [`Misuses`] set that only ever grows, and the set can be
//! rendered as a human readable report through its [`Display`](core::fmt::Display)
//! implementation.

use core::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Misuse {
    /// A size below one was passed to the constructor, so the capacity was clamped to one.
    NonPositiveSize,
    /// An out-of-range index was used with a checked accessor.
    InvalidIndex,
    /// A size below one was passed to `change_size`, so the array was left unchanged.
    NonPositiveResize,
}

impl Misuse {

    pub const ALL: [Self; 3] = [
        Self::NonPositiveSize,
        Self::InvalidIndex,
        Self::NonPositiveResize,
    ];

    /// Returns the legacy flag value of this kind.
    #[inline(always)]
    pub const fn code(self) -> u32 {
        match self {
            Self::NonPositiveSize => 1,
            Self::InvalidIndex => 2,
            Self::NonPositiveResize => 4,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NonPositiveSize => {
                "Nonpositive size passed into constructor, so\n\
                the capacity was set to 1 by default.\n"
            },
            Self::InvalidIndex => {
                "Invalid index was used\n"
            },
            Self::NonPositiveResize => {
                "Nonpositive new size passed into change_size, so\n\
                the size of the array was not changed.\n"
            },
        }
    }
}

/// An accumulating set of [`Misuse`] kinds.
///
/// There is deliberately no way to remove a single kind. A register is only ever reset by
/// replacing it as a whole.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Misuses {
    bits: u32,
}

impl Misuses {

    #[inline(always)]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline(always)]
    pub const fn contains(self, misuse: Misuse) -> bool {
        self.bits & misuse.code() != 0
    }

    #[inline(always)]
    pub fn insert(&mut self, misuse: Misuse) {
        self.bits |= misuse.code();
    }

    #[inline(always)]
    pub const fn with(self, misuse: Misuse) -> Self {
        Self { bits: self.bits | misuse.code() }
    }

    #[inline(always)]
    pub const fn union(self, other: Self) -> Self {
        Self { bits: self.bits | other.bits }
    }

    /// Returns the combined legacy flag value, zero when empty.
    #[inline(always)]
    pub const fn code(self) -> u32 {
        self.bits
    }

    pub fn len(self) -> usize {
        self.iter().count()
    }

    /// Yields the recorded kinds in ascending order.
    pub fn iter(self) -> impl Iterator<Item = Misuse> {
        Misuse::ALL
            .into_iter()
            .filter(move |&misuse| self.contains(misuse))
    }
}

impl From<Misuse> for Misuses {

    fn from(value: Misuse) -> Self {
        Self::empty().with(value)
    }
}

impl FromIterator<Misuse> for Misuses {

    fn from_iter<I: IntoIterator<Item = Misuse>>(iter: I) -> Self {
        let mut misuses = Self::empty();
        for misuse in iter {
            misuses.insert(misuse);
        }
        misuses
    }
}

impl Extend<Misuse> for Misuses {

    fn extend<I: IntoIterator<Item = Misuse>>(&mut self, iter: I) {
        for misuse in iter {
            self.insert(misuse);
        }
    }
}

impl fmt::Debug for Misuses {

    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Display for Misuses {

    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No error.\n")
        }
        for misuse in self.iter() {
            f.write_str(misuse.message())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_report() {
        assert_eq!(Misuses::empty().to_string(), "No error.\n");
        assert_eq!(Misuses::default().code(), 0);
    }

    #[test]
    fn insert_accumulates() {
        let mut misuses = Misuses::empty();
        misuses.insert(Misuse::NonPositiveResize);
        misuses.insert(Misuse::NonPositiveSize);
        misuses.insert(Misuse::NonPositiveResize);
        assert!(misuses.contains(Misuse::NonPositiveSize));
        assert!(!misuses.contains(Misuse::InvalidIndex));
        assert!(misuses.contains(Misuse::NonPositiveResize));
        assert_eq!(misuses.code(), 5);
        assert_eq!(misuses.len(), 2);
    }

    #[test]
    fn iter_is_ascending() {
        let misuses: Misuses = [
            Misuse::NonPositiveResize,
            Misuse::InvalidIndex,
            Misuse::NonPositiveSize,
        ].into_iter().collect();
        let kinds: Vec<_> = misuses.iter().collect();
        assert_eq!(kinds, Misuse::ALL.to_vec());
        assert_eq!(misuses.code(), 7);
    }

    #[test]
    fn report_follows_flag_order() {
        let misuses = Misuses::from(Misuse::NonPositiveResize)
            .with(Misuse::NonPositiveSize);
        assert_eq!(
            misuses.to_string(),
            "Nonpositive size passed into constructor, so\n\
            the capacity was set to 1 by default.\n\
            Nonpositive new size passed into change_size, so\n\
            the size of the array was not changed.\n",
        );
    }

    #[test]
    fn union_keeps_both_sides() {
        let a = Misuses::from(Misuse::InvalidIndex);
        let b = Misuses::from(Misuse::NonPositiveSize);
        let c = a.union(b);
        assert_eq!(c.code(), 3);
        assert_eq!(format!("{:?}", c), "{NonPositiveSize, InvalidIndex}");
    }
}
