#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Literals in DIMACS numbering.
//!
//! Variables are 1-based, a literal is stored as the signed DIMACS integer
//! (`3` is the variable 3, `-3` its negation). This keeps the encoders close
//! to the way the clauses are written down and makes DIMACS export trivial.

use core::ops::{Neg, Not};
use std::fmt::{Display, Formatter};

/// A 1-based propositional variable index.
pub type Variable = u32;

/// A variable or its negation, stored as a non-zero DIMACS integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(i32);

impl Literal {
    /// Creates a literal of `var`; `polarity == false` yields the negation.
    ///
    /// # Panics
    ///
    /// If `var` is zero or does not fit into a DIMACS integer.
    #[must_use]
    pub fn new(var: Variable, polarity: bool) -> Self {
        assert!(var != 0, "variable 0 is not a valid DIMACS variable");
        let var = i32::try_from(var).expect("literal variable overflowed");

        if polarity { Self(var) } else { Self(-var) }
    }

    /// The literal that is true when `var` is.
    #[must_use]
    pub fn positive(var: Variable) -> Self {
        Self::new(var, true)
    }

    /// The literal that is true when `var` is false.
    #[must_use]
    pub fn negative(var: Variable) -> Self {
        Self::new(var, false)
    }

    /// The underlying variable, whatever the sign.
    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0.is_positive()
    }

    /// The complementary literal.
    #[must_use]
    pub const fn negated(self) -> Self {
        Self(-self.0)
    }

    /// The signed DIMACS integer.
    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0
    }

    /// Reads a non-zero DIMACS integer.
    ///
    /// # Panics
    ///
    /// If `value` is zero, which DIMACS reserves as the clause terminator.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        assert!(value != 0, "0 terminates a clause and is not a literal");
        Self(value)
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
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Literal> for varisat::Lit {
    fn from(lit: Literal) -> Self {
        Self::from_dimacs(lit.0 as isize)
    }
}

impl From<varisat::Lit> for Literal {
    fn from(lit: varisat::Lit) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self::from_i32(lit.to_dimacs() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new(1, false).negated(), Literal::new(1, true));
        assert_eq!(!Literal::new(1, true), Literal::new(1, false));
        assert_eq!(-Literal::positive(7), Literal::negative(7));
    }

    #[test]
    fn test_literal_parts() {
        let lit = Literal::from_i32(-12);
        assert_eq!(lit.variable(), 12);
        assert!(!lit.polarity());
        assert_eq!(lit.to_i32(), -12);
        assert_eq!(lit.to_string(), "-12");
    }

    #[test]
    fn test_varisat_round_trip() {
        let lit = Literal::negative(5);
        let engine: varisat::Lit = lit.into();
        assert!(engine.is_negative());
        assert_eq!(engine.var().to_dimacs(), 5);
        assert_eq!(Literal::from(engine), lit);
    }

    #[test]
    #[should_panic(expected = "variable 0")]
    fn test_zero_variable_rejected() {
        let _ = Literal::positive(0);
    }
}
