#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Signed literals as they appear in DIMACS files.
//!
//! A `Literal` wraps a nonzero `i32`: the absolute value is the variable and
//! the sign is the polarity. `0` is the clause terminator of the text format
//! and is never a valid literal.

use core::ops::{Neg, Not};
use std::fmt::{self, Display};

/// A propositional variable, numbered from 1.
pub type Variable = u32;

/// A variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Creates the literal of `var` with the given polarity (`true` is positive).
    ///
    /// # Panics
    ///
    /// If `var` is `0` or does not fit in an `i32`.
    #[must_use]
    pub fn new(var: Variable, polarity: bool) -> Self {
        let var = i32::try_from(var).expect("variable overflowed i32");
        assert_ne!(var, 0, "variable 0 is reserved");
        if polarity { Self(var) } else { Self(-var) }
    }

    /// Interprets a DIMACS integer. Returns `None` for the `0` terminator.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        if value == 0 || value == i32::MIN {
            None
        } else {
            Some(Self(value))
        }
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(-self.0)
    }

    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0
    }

    /// Dense index for literal-keyed arrays: `2 * var` for the positive
    /// literal and `2 * var + 1` for the negative one.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.variable() as usize) << 1 | self.is_negated() as usize
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Literal {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i32(value).ok_or(value)
    }
}
