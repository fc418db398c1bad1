use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use smallvec::SmallVec;
use tracing::trace;

use crate::printer::PolynomialPrinter;

use super::{Coefficient, Exponent, INLINED_TERMS};

/// A single term `coefficient * x^exponent`, where the coefficient is itself a
/// polynomial in the next variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Monomial {
    pub exponent: Exponent,
    pub coefficient: Polynomial,
}

impl Monomial {
    /// Wraps `coefficient` as the coefficient of a single term with the given
    /// exponent, taking ownership of it.
    #[inline]
    pub fn new(coefficient: Polynomial, exponent: Exponent) -> Monomial {
        debug_assert!(exponent >= 0);
        Monomial {
            exponent,
            coefficient,
        }
    }
}

/// A sparse polynomial with a recursive coefficient representation.
///
/// Canonical form, maintained by every constructing operation:
/// - `terms` is strictly ascending by exponent, with no duplicates;
/// - no term's coefficient is zero;
/// - an exponent-0 term with a pure-scalar coefficient is folded into
///   `constant` (an exponent-0 term survives only when its coefficient still
///   involves deeper variables);
/// - an empty `terms` list makes the value a plain integer (`constant`), which
///   is how the recursion bottoms out.
///
/// The derived equality is structural and therefore only meaningful on
/// canonical values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Polynomial {
    pub constant: Coefficient,
    pub terms: Vec<Monomial>,
}

impl Polynomial {
    /// The zero polynomial. Does not allocate.
    #[inline]
    pub const fn zero() -> Polynomial {
        Polynomial {
            constant: 0,
            terms: Vec::new(),
        }
    }

    /// A polynomial that is the plain integer `c`. Does not allocate.
    #[inline]
    pub const fn constant(c: Coefficient) -> Polynomial {
        Polynomial {
            constant: c,
            terms: Vec::new(),
        }
    }

    /// A polynomial with the single term `coefficient * x^exponent`,
    /// canonicalized.
    pub fn monomial(coefficient: Polynomial, exponent: Exponent) -> Polynomial {
        Polynomial::from_monomials([Monomial::new(coefficient, exponent)])
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.constant == 0 && self.terms.is_empty()
    }

    /// Returns true iff the value is a plain integer, i.e. the coefficient
    /// recursion bottoms out here.
    #[inline]
    pub fn is_coefficient(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the number of terms, not counting the constant.
    #[inline]
    pub fn nterms(&self) -> usize {
        self.terms.len()
    }

    /// Builds a canonical polynomial from an arbitrary monomial collection:
    /// the terms are sorted by exponent, duplicates are merged by recursive
    /// addition, zero coefficients are dropped and a scalar exponent-0 term is
    /// folded into the constant. Idempotent on already-canonical input.
    pub fn from_monomials(monomials: impl IntoIterator<Item = Monomial>) -> Polynomial {
        let mut monomials: SmallVec<[Monomial; INLINED_TERMS]> =
            monomials.into_iter().collect();
        monomials.sort_by(|a, b| a.exponent.cmp(&b.exponent));

        let mut terms: Vec<Monomial> = Vec::with_capacity(monomials.len());
        for m in monomials {
            if m.coefficient.is_zero() {
                continue;
            }

            match terms.last_mut() {
                Some(last) if last.exponent == m.exponent => {
                    let sum = &last.coefficient + &m.coefficient;
                    if sum.is_zero() {
                        terms.pop();
                    } else {
                        last.coefficient = sum;
                    }
                }
                _ => terms.push(m),
            }
        }

        canonicalize(0, terms)
    }

    /// Multiplies every coefficient, and the constant, by the scalar `k`.
    pub fn mul_scalar(&self, k: Coefficient) -> Polynomial {
        if k == 0 || self.is_zero() {
            return Polynomial::zero();
        }

        let constant = self.constant.wrapping_mul(k);
        let mut terms = Vec::with_capacity(self.terms.len());
        for m in &self.terms {
            let coefficient = m.coefficient.mul_scalar(k);
            if !coefficient.is_zero() {
                terms.push(Monomial::new(coefficient, m.exponent));
            }
        }

        canonicalize(constant, terms)
    }

    /// Computes `self^e` by repeated squaring. `pow(0)` is 1 for every base,
    /// including zero; the 0^0 = 1 convention follows the reference
    /// calculator and is pinned down by a test.
    pub fn pow(&self, mut e: u32) -> Polynomial {
        if e == 0 {
            return Polynomial::constant(1);
        }

        if self.is_coefficient() {
            return Polynomial::constant(coefficient_pow(self.constant, e));
        }

        let mut x = self.clone();
        let mut y = Polynomial::constant(1);
        while e != 1 {
            if e % 2 == 1 {
                y = &y * &x;
                e -= 1;
            }

            x = &x * &x;
            e /= 2;
        }

        &x * &y
    }

    /// Substitutes the integer `x` for the outermost variable. The result is
    /// one variable narrower: the coefficients, polynomials in the remaining
    /// variables, become the outer layer.
    pub fn evaluate(&self, x: Coefficient) -> Polynomial {
        let mut result = Polynomial::constant(self.constant);
        for m in &self.terms {
            let scale = coefficient_pow(x, m.exponent as u32);
            let contribution = m.coefficient.mul_scalar(scale);
            result = &result + &contribution;
        }
        result
    }

    /// Substitutes `values[i]` for the i-th variable. Variables beyond
    /// `values.len()` are left free, so `compose(&[])` is the identity.
    pub fn compose(&self, values: &[Polynomial]) -> Polynomial {
        let Some((outer, rest)) = values.split_first() else {
            return self.clone();
        };

        let mut result = Polynomial::constant(self.constant);
        for m in &self.terms {
            let term = &outer.pow(m.exponent as u32) * &m.coefficient.compose(rest);
            result = &result + &term;
        }
        result
    }

    /// The degree of the polynomial in the variable with index `var`:
    /// -1 for the zero polynomial and 0 for a plain integer.
    pub fn degree_in(&self, var: usize) -> Exponent {
        if self.is_zero() {
            return -1;
        }
        if self.is_coefficient() {
            return 0;
        }

        if var == 0 {
            // sorted terms: the last one carries the highest exponent
            return self.terms.last().map(|m| m.exponent).unwrap_or(0);
        }

        self.terms
            .iter()
            .map(|m| m.coefficient.degree_in(var - 1))
            .max()
            .unwrap_or(0)
    }

    /// The total degree over all variables: -1 for the zero polynomial and 0
    /// for a plain integer.
    pub fn total_degree(&self) -> Exponent {
        if self.is_zero() {
            return -1;
        }

        let mut r = 0;
        for m in &self.terms {
            r = r.max(m.exponent.saturating_add(m.coefficient.total_degree()));
        }
        r
    }
}

/// Re-establishes the constant-folding invariant on a sorted, merged,
/// zero-free term list: a leading exponent-0 term whose coefficient collapsed
/// to a plain integer moves into the constant.
fn canonicalize(constant: Coefficient, mut terms: Vec<Monomial>) -> Polynomial {
    let mut constant = constant;
    if let Some(first) = terms.first() {
        if first.exponent == 0 && first.coefficient.is_coefficient() {
            constant = constant.wrapping_add(terms.remove(0).coefficient.constant);
        }
    }
    Polynomial { constant, terms }
}

/// Integer `base^e` by repeated squaring, wrapping on overflow.
fn coefficient_pow(base: Coefficient, mut e: u32) -> Coefficient {
    let mut x = base;
    let mut y: Coefficient = 1;
    while e != 0 {
        if e % 2 == 1 {
            y = y.wrapping_mul(x);
        }
        x = x.wrapping_mul(x);
        e /= 2;
    }
    y
}

impl Add for &Polynomial {
    type Output = Polynomial;

    /// Merges the two sorted term lists in O(|p| + |q|). Equal exponents
    /// combine by recursive addition; sums that vanish are dropped.
    fn add(self, other: &Polynomial) -> Polynomial {
        let constant = self.constant.wrapping_add(other.constant);
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());

        let mut i = 0;
        let mut j = 0;
        while i < self.terms.len() && j < other.terms.len() {
            let a = &self.terms[i];
            let b = &other.terms[j];
            match a.exponent.cmp(&b.exponent) {
                Ordering::Less => {
                    terms.push(a.clone());
                    i += 1;
                }
                Ordering::Greater => {
                    terms.push(b.clone());
                    j += 1;
                }
                Ordering::Equal => {
                    let sum = &a.coefficient + &b.coefficient;
                    if !sum.is_zero() {
                        terms.push(Monomial::new(sum, a.exponent));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        terms.extend_from_slice(&self.terms[i..]);
        terms.extend_from_slice(&other.terms[j..]);

        canonicalize(constant, terms)
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, other: &Polynomial) -> Polynomial {
        self + &-other
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            constant: self.constant.wrapping_neg(),
            terms: self
                .terms
                .iter()
                .map(|m| Monomial::new(-&m.coefficient, m.exponent))
                .collect(),
        }
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    /// Decomposes `p*q` into the constant product, the two scalar-scaled term
    /// lists and the full pairwise cross product, then re-sorts and merges the
    /// raw buffer. A zero operand short-circuits without touching the other.
    fn mul(self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }

        let mut raw: SmallVec<[Monomial; INLINED_TERMS]> =
            SmallVec::with_capacity(self.terms.len() * other.terms.len());

        for a in &self.terms {
            for b in &other.terms {
                let coefficient = &a.coefficient * &b.coefficient;
                if !coefficient.is_zero() {
                    raw.push(Monomial::new(
                        coefficient,
                        a.exponent.saturating_add(b.exponent),
                    ));
                }
            }
        }

        for a in &self.terms {
            let coefficient = a.coefficient.mul_scalar(other.constant);
            if !coefficient.is_zero() {
                raw.push(Monomial::new(coefficient, a.exponent));
            }
        }

        for b in &other.terms {
            let coefficient = b.coefficient.mul_scalar(self.constant);
            if !coefficient.is_zero() {
                raw.push(Monomial::new(coefficient, b.exponent));
            }
        }

        trace!(
            left = self.terms.len(),
            right = other.terms.len(),
            raw = raw.len(),
            "merging cross terms"
        );

        let mut result = Polynomial::from_monomials(raw);
        result.constant = result
            .constant
            .wrapping_add(self.constant.wrapping_mul(other.constant));
        result
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", PolynomialPrinter::new(self))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// The polynomial `x`, i.e. the outermost variable.
    fn x() -> Polynomial {
        Polynomial::monomial(Polynomial::constant(1), 1)
    }

    /// The polynomial `x_depth` nested under `depth` coefficient layers.
    fn var(depth: usize) -> Polynomial {
        let mut p = x();
        for _ in 0..depth {
            p = Polynomial::monomial(p, 0);
        }
        p
    }

    #[test]
    fn constructors_do_not_allocate_terms() {
        assert!(Polynomial::zero().terms.is_empty());
        assert!(Polynomial::constant(7).terms.is_empty());
        assert!(Polynomial::zero().is_zero());
        assert!(Polynomial::constant(7).is_coefficient());
        assert!(!Polynomial::constant(7).is_zero());
    }

    #[test]
    fn add_is_commutative_and_associative() {
        let a = &Polynomial::monomial(Polynomial::constant(3), 2) + &Polynomial::constant(1);
        let b = Polynomial::monomial(var(1), 2);
        let c = Polynomial::monomial(Polynomial::constant(-3), 2);

        assert_eq!(&a + &b, &b + &a);
        assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
    }

    #[test]
    fn add_merges_equal_exponents_and_drops_zero_sums() {
        let p = Polynomial::monomial(Polynomial::constant(3), 2);
        let q = Polynomial::monomial(Polynomial::constant(-3), 2);
        assert!((&p + &q).is_zero());

        let r = &p + &p;
        assert_eq!(r.nterms(), 1);
        assert_eq!(r.terms[0].coefficient, Polynomial::constant(6));
    }

    #[test]
    fn add_folds_collapsed_exponent_zero_terms() {
        // (x1 + 2, 0) + (-x1 + 3, 0): the coefficients cancel down to the
        // scalar 5, which must migrate into the constant.
        let p = Polynomial::monomial(&var(1) + &Polynomial::constant(2), 0);
        let q = Polynomial::monomial(&-&var(1) + &Polynomial::constant(3), 0);
        let sum = &p + &q;
        assert_eq!(sum, Polynomial::constant(5));
    }

    #[test]
    fn identity_laws() {
        let p = &Polynomial::monomial(var(1), 3) + &Polynomial::constant(4);

        assert_eq!(&p + &Polynomial::zero(), p);
        assert_eq!(&p * &Polynomial::constant(1), p);
        assert!((&p * &Polynomial::zero()).is_zero());
    }

    #[test]
    fn mul_zero_short_circuits() {
        let p = Polynomial::monomial(var(2), 7);
        assert!((&Polynomial::constant(0) * &p).is_zero());
        assert!((&p * &Polynomial::constant(0)).is_zero());
    }

    #[test]
    fn mul_expands_cross_terms() {
        // (x + 1)(x - 1) = x^2 - 1
        let a = &x() + &Polynomial::constant(1);
        let b = &x() - &Polynomial::constant(1);
        let expected =
            &Polynomial::monomial(Polynomial::constant(1), 2) - &Polynomial::constant(1);
        assert_eq!(&a * &b, expected);
    }

    #[test]
    fn mul_merges_duplicate_cross_exponents() {
        // (x + x^2)(x + x^2) = x^2 + 2x^3 + x^4; the two x^3 cross terms
        // must merge after the raw buffer is re-sorted.
        let p = &x() + &Polynomial::monomial(Polynomial::constant(1), 2);
        let r = &p * &p;
        assert_eq!(r.nterms(), 3);
        assert_eq!(r.terms[1].exponent, 3);
        assert_eq!(r.terms[1].coefficient, Polynomial::constant(2));
    }

    #[test]
    fn sub_and_neg() {
        let p = &Polynomial::monomial(Polynomial::constant(2), 1) + &Polynomial::constant(7);
        assert!((&p - &p).is_zero());
        assert_eq!(&-&p + &p, Polynomial::zero());
        assert_eq!(-&-&p, p);
    }

    #[test]
    fn scalar_mul_drops_vanishing_terms() {
        let p = &Polynomial::monomial(Polynomial::constant(2), 1) + &Polynomial::constant(3);
        assert!(p.mul_scalar(0).is_zero());

        let r = p.mul_scalar(-2);
        assert_eq!(r.constant, -6);
        assert_eq!(r.terms[0].coefficient, Polynomial::constant(-4));
    }

    #[test]
    fn pow_zero_exponent_is_one_even_for_zero_base() {
        // accepted 0^0 = 1 convention, not a law to build on
        assert_eq!(Polynomial::zero().pow(0), Polynomial::constant(1));
        assert_eq!(x().pow(0), Polynomial::constant(1));
    }

    #[test]
    fn pow_by_squaring() {
        let p = &x() + &Polynomial::constant(1);
        let expected = &(&p * &p) * &p;
        assert_eq!(p.pow(3), expected);
        assert_eq!(Polynomial::constant(3).pow(4), Polynomial::constant(81));
    }

    #[test]
    fn evaluate_substitutes_outermost_variable() {
        // x at x = 3 is the plain integer 3
        assert_eq!(x().evaluate(3), Polynomial::constant(3));

        // 2x^2 + 5 at x = 3 is 23
        let p = &Polynomial::monomial(Polynomial::constant(2), 2) + &Polynomial::constant(5);
        assert_eq!(p.evaluate(3), Polynomial::constant(23));

        // x0^2 * x1 at x0 = 2 is 4 * x1, now the outermost variable
        let p = Polynomial::monomial(x(), 2);
        assert_eq!(p.evaluate(2), x().mul_scalar(4));
    }

    #[test]
    fn compose_with_no_values_is_identity() {
        for p in [Polynomial::zero(), Polynomial::constant(3829), x(), var(2)] {
            assert_eq!(p.compose(&[]), p);
        }
    }

    #[test]
    fn compose_scalar_into_zero_and_constant() {
        assert!(Polynomial::zero().compose(&[Polynomial::constant(2817)]).is_zero());
        assert_eq!(
            Polynomial::constant(1209).compose(&[Polynomial::constant(2817)]),
            Polynomial::constant(1209)
        );
    }

    #[test]
    fn compose_substitutes_for_the_outermost_variable() {
        assert_eq!(
            x().compose(&[Polynomial::constant(21989)]),
            Polynomial::constant(21989)
        );
        assert_eq!(x().compose(&[x()]), x());

        // (x0 + 1)^2 via composing x0^2 with x0 + 1
        let p = Polynomial::monomial(Polynomial::constant(1), 2);
        let shifted = &x() + &Polynomial::constant(1);
        assert_eq!(p.compose(&[shifted.clone()]), shifted.pow(2));
    }

    #[test]
    fn compose_leaves_deeper_variables_free() {
        // x0 * x1 with only x0 substituted: x1 stays free and moves outward
        let p = Polynomial::monomial(x(), 1);
        assert_eq!(p.compose(&[Polynomial::constant(3)]), x().mul_scalar(3));
    }

    #[test]
    fn degree_boundaries() {
        assert_eq!(Polynomial::zero().total_degree(), -1);
        assert_eq!(Polynomial::constant(5).total_degree(), 0);
        assert_eq!(Polynomial::zero().degree_in(0), -1);
        assert_eq!(Polynomial::constant(5).degree_in(3), 0);
    }

    #[test]
    fn degree_in_each_variable() {
        // x0 + x0^2
        let p = &x() + &Polynomial::monomial(Polynomial::constant(1), 2);
        assert_eq!(p.degree_in(0), 2);
        assert_eq!(p.degree_in(1), 0);

        // x0^3 * x1^5
        let q = Polynomial::monomial(Polynomial::monomial(Polynomial::constant(1), 5), 3);
        assert_eq!(q.degree_in(0), 3);
        assert_eq!(q.degree_in(1), 5);
        assert_eq!(q.degree_in(2), 0);
        assert_eq!(q.total_degree(), 8);
    }

    #[test]
    fn from_monomials_is_idempotent_on_canonical_input() {
        let p = &Polynomial::monomial(var(1), 2) + &Polynomial::constant(9);
        let again = Polynomial::from_monomials(p.terms.clone());
        assert_eq!(&again + &Polynomial::constant(p.constant), p);
    }

    #[test]
    fn from_monomials_folds_scalar_exponent_zero() {
        // the raw term (2, 0) is the same value as the plain integer 2
        let p = Polynomial::from_monomials([Monomial::new(Polynomial::constant(2), 0)]);
        assert_eq!(p, Polynomial::constant(2));
    }

    #[test]
    fn from_monomials_sorts_and_merges() {
        let p = Polynomial::from_monomials([
            Monomial::new(Polynomial::constant(1), 3),
            Monomial::new(Polynomial::constant(4), 1),
            Monomial::new(Polynomial::constant(2), 3),
        ]);
        assert_eq!(p.nterms(), 2);
        assert_eq!(p.terms[0].exponent, 1);
        assert_eq!(p.terms[1].exponent, 3);
        assert_eq!(p.terms[1].coefficient, Polynomial::constant(3));
    }

    #[test]
    fn equality_is_structural_on_canonical_values() {
        let p = &Polynomial::monomial(var(1), 2) + &Polynomial::constant(1);
        let q = &Polynomial::constant(1) + &Polynomial::monomial(var(1), 2);
        assert_eq!(p, q);
        assert_ne!(p, Polynomial::monomial(var(1), 2));
    }
}
