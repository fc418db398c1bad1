//! Polycalc is a postfix calculator for sparse multivariate polynomials.
//!
//! A polynomial is stored recursively: the coefficient of every term is itself
//! a polynomial in the next variable, and the recursion bottoms out at a plain
//! integer constant. All values are kept in a canonical form (terms sorted by
//! exponent, duplicates merged, zero coefficients dropped, scalar constants
//! folded out of the term list), so structural equality and printing agree
//! with the algebra.
//!
//! For example:
//!
//! ```
//! use polycalc::parser;
//!
//! let p = parser::parse_literal("((1,2),3)+(5,0)", 1).unwrap();
//! let q = parser::parse_literal("(5,0)+((1,2),3)", 1).unwrap();
//! assert_eq!(p, q);
//! assert_eq!(p.total_degree(), 5);
//! assert_eq!(p.to_string(), "(5,0)+((1,2),3)");
//! ```
//!
//! The calculator itself is line oriented: a line starting with a letter is a
//! command acting on the evaluation stack, anything else is a polynomial
//! literal that is parsed and pushed. See [`calculator::run_session`].

pub mod calculator;
pub mod parser;
pub mod poly;
pub mod printer;
pub mod stack;
