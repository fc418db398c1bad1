use std::fmt;

use smallvec::SmallVec;
use tracing::debug;

use crate::poly::polynomial::{Monomial, Polynomial};
use crate::poly::{Coefficient, Exponent, EXP_MAX, INLINED_TERMS};

/// Which numeric range a scanned token must fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    /// A monomial exponent: unsigned, at most [`EXP_MAX`].
    Exponent,
    /// A polynomial coefficient: the full signed 64-bit range. The negative
    /// bound is one larger in magnitude than the positive one.
    Coefficient,
    /// A generic unsigned count: at most `u32::MAX`.
    Count,
}

/// A malformed literal or numeric token. The row is 1-indexed; the column is
/// the 1-indexed position of the character at which the error was detected
/// (one past the end of the input when a required character is missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub row: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed input at row {} column {}",
            self.row, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// Recursive-descent reader for the polynomial literal notation, with a
/// one-byte lookahead and explicit row/column state (no ambient globals).
///
/// A literal is either a `+`-separated list of `(coefficient,exponent)`
/// monomials or a bare signed integer; monomial coefficients recurse into the
/// same grammar. Lists are not assumed sorted or deduplicated: the collected
/// buffer is canonicalized through [`Polynomial::from_monomials`].
///
/// On any error the parser bails out immediately; partially built values are
/// dropped and never observable.
pub struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    row: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    /// A parser over `input`, reporting errors against the 1-indexed `row`.
    pub fn new(input: &'a str, row: usize) -> Parser<'a> {
        Parser {
            input: input.as_bytes(),
            pos: 0,
            row,
            column: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Consumes one byte. The column advances even past the end of input, so
    /// a missing-character error points one past the last character.
    #[inline]
    fn bump(&mut self) -> Option<u8> {
        let c = self.input.get(self.pos).copied();
        self.pos += 1;
        self.column += 1;
        if c == Some(b'\n') {
            self.row += 1;
            self.column = 0;
        }
        c
    }

    /// An error at the position of the last consumed character.
    fn error<T>(&self) -> Result<T, ParseError> {
        debug!(row = self.row, column = self.column, "rejecting literal");
        Err(ParseError {
            row: self.row,
            column: self.column,
        })
    }

    fn expect(&mut self, c: u8) -> Result<(), ParseError> {
        if self.bump() == Some(c) {
            Ok(())
        } else {
            self.error()
        }
    }

    /// True when the whole input has been consumed.
    pub fn is_done(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Scans an integer token, rejecting an overflowing digit *before*
    /// accumulating it: the partial value is compared against `limit / 10`
    /// and the incoming digit against `limit % 10`. A minus sign is only
    /// legal for [`NumberKind::Coefficient`].
    pub fn parse_number(&mut self, kind: NumberKind) -> Result<i64, ParseError> {
        let minus = self.peek() == Some(b'-');
        if minus {
            self.bump();
            if kind != NumberKind::Coefficient {
                return self.error();
            }
        }

        let limit: u64 = match kind {
            NumberKind::Exponent => EXP_MAX as u64,
            // |i64::MIN| is one more than i64::MAX
            NumberKind::Coefficient if minus => (i64::MAX as u64) + 1,
            NumberKind::Coefficient => i64::MAX as u64,
            NumberKind::Count => u32::MAX as u64,
        };

        let mut acc: u64 = 0;
        let mut digits = 0usize;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();

            let digit = (c - b'0') as u64;
            if acc > limit / 10 || (acc == limit / 10 && digit > limit % 10) {
                return self.error();
            }

            acc = 10 * acc + digit;
            digits += 1;
        }

        if digits == 0 {
            // consume the offending character so the column points at it
            self.bump();
            return self.error();
        }

        Ok(if minus {
            (acc as i64).wrapping_neg()
        } else {
            acc as i64
        })
    }

    fn parse_monomial(&mut self) -> Result<Monomial, ParseError> {
        self.expect(b'(')?;
        let coefficient = self.parse_polynomial()?;
        self.expect(b',')?;
        let exponent = self.parse_number(NumberKind::Exponent)? as Exponent;
        self.expect(b')')?;
        Ok(Monomial::new(coefficient, exponent))
    }

    /// Parses one polynomial literal: a leading `(` selects the monomial-list
    /// form, anything else is read as a bare signed coefficient.
    pub fn parse_polynomial(&mut self) -> Result<Polynomial, ParseError> {
        if self.peek() == Some(b'(') {
            let mut monomials: SmallVec<[Monomial; INLINED_TERMS]> = SmallVec::new();
            loop {
                monomials.push(self.parse_monomial()?);
                if self.peek() == Some(b'+') {
                    self.bump();
                } else {
                    break;
                }
            }
            Ok(Polynomial::from_monomials(monomials))
        } else {
            Ok(Polynomial::constant(
                self.parse_number(NumberKind::Coefficient)?,
            ))
        }
    }
}

/// Parses a full input line as a polynomial literal; trailing characters are
/// a parse error at their column.
pub fn parse_literal(line: &str, row: usize) -> Result<Polynomial, ParseError> {
    let mut parser = Parser::new(line, row);
    let poly = parser.parse_polynomial()?;
    if !parser.is_done() {
        parser.bump();
        return parser.error();
    }
    Ok(poly)
}

/// Scans a fixed command-argument token as an unsigned count.
pub fn parse_count(token: &str, row: usize) -> Result<u32, ParseError> {
    let mut parser = Parser::new(token, row);
    let n = parser.parse_number(NumberKind::Count)?;
    if !parser.is_done() {
        parser.bump();
        return parser.error();
    }
    Ok(n as u32)
}

/// Scans a fixed command-argument token as a signed coefficient.
pub fn parse_coefficient(token: &str, row: usize) -> Result<Coefficient, ParseError> {
    let mut parser = Parser::new(token, row);
    let x = parser.parse_number(NumberKind::Coefficient)?;
    if !parser.is_done() {
        parser.bump();
        return parser.error();
    }
    Ok(x)
}
