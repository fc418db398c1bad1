use std::fmt;

use crate::poly::polynomial::Polynomial;

/// Renders a polynomial in the calculator's literal notation: a plain integer
/// for a coefficient polynomial, otherwise `(coeff,exp)` terms joined by `+`
/// with a non-zero constant emitted as a leading `(constant,0)` term.
///
/// The rendering never repeats an exponent: when the constant coexists with an
/// exponent-0 term (one whose coefficient involves deeper variables), it is
/// folded into that term's coefficient for printing. Everything the printer
/// emits parses back to a structurally equal value.
pub struct PolynomialPrinter<'a> {
    pub poly: &'a Polynomial,
}

impl<'a> PolynomialPrinter<'a> {
    pub fn new(poly: &'a Polynomial) -> PolynomialPrinter<'a> {
        PolynomialPrinter { poly }
    }
}

impl fmt::Display for PolynomialPrinter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.poly;

        if p.is_coefficient() {
            return write!(f, "{}", p.constant);
        }

        let mut terms = p.terms.iter();
        let mut first = true;

        if p.constant != 0 {
            if p.terms[0].exponent == 0 {
                // canonical form guarantees this coefficient is not scalar,
                // so adding the constant cannot collapse it
                let folded =
                    &terms.next().map(|m| m.coefficient.clone()).unwrap_or_default()
                        + &Polynomial::constant(p.constant);
                write!(f, "({},0)", PolynomialPrinter::new(&folded))?;
            } else {
                write!(f, "({},0)", p.constant)?;
            }
            first = false;
        }

        for m in terms {
            if !first {
                f.write_str("+")?;
            }
            first = false;
            write!(
                f,
                "({},{})",
                PolynomialPrinter::new(&m.coefficient),
                m.exponent
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::poly::polynomial::Monomial;

    fn x() -> Polynomial {
        Polynomial::monomial(Polynomial::constant(1), 1)
    }

    #[test]
    fn coefficient_polynomials_print_as_bare_integers() {
        assert_eq!(Polynomial::zero().to_string(), "0");
        assert_eq!(Polynomial::constant(-42).to_string(), "-42");
    }

    #[test]
    fn terms_print_in_ascending_exponent_order() {
        let p = &x() + &Polynomial::monomial(Polynomial::constant(3), 4);
        assert_eq!(p.to_string(), "(1,1)+(3,4)");
    }

    #[test]
    fn constant_prints_as_leading_exponent_zero_term() {
        let p = &x() + &Polynomial::constant(5);
        assert_eq!(p.to_string(), "(5,0)+(1,1)");
    }

    #[test]
    fn constant_folds_into_an_existing_exponent_zero_term() {
        // 5 + x1 + x0: the x1 term sits at exponent 0, so the constant joins
        // its coefficient instead of duplicating the exponent
        let x1 = Polynomial::from_monomials([Monomial::new(x(), 0)]);
        let p = &(&x() + &x1) + &Polynomial::constant(5);
        assert_eq!(p.to_string(), "((5,0)+(1,1),0)+(1,1)");
    }

    #[test]
    fn nested_coefficients_render_recursively() {
        // x0^3 * x1^2
        let p = Polynomial::monomial(Polynomial::monomial(Polynomial::constant(1), 2), 3);
        assert_eq!(p.to_string(), "((1,2),3)");
    }
}
