use std::fmt;
use std::io::{self, BufRead, Write};

use smartstring::{LazyCompact, SmartString};
use tracing::debug;

use crate::parser::{self, ParseError};
use crate::poly::polynomial::Polynomial;
use crate::poly::Exponent;
use crate::stack::Stack;

/// Which argument of a command failed to scan; selects the diagnostic wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// The evaluation point of `AT`.
    Value,
    /// The variable index of `DEG_BY`.
    Variable,
    /// The substitution count of `COMPOSE`.
    Count,
}

/// Errors surfaced to the session layer, each carrying the 1-indexed row of
/// the offending input line. The `Display` impl produces the exact diagnostic
/// lines of the calculator protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    /// An operation needed more stack elements than were available; the stack
    /// was left in its pre-operation state.
    StackUnderflow { row: usize },
    /// A malformed polynomial literal.
    Parse(ParseError),
    /// The command word is not part of the protocol.
    UnrecognizedCommand { row: usize },
    /// A command argument failed to scan or was out of range.
    InvalidArgumentValue { row: usize, arg: ArgKind },
    /// A known command was given the wrong number of arguments.
    InvalidArgumentCount { row: usize },
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::StackUnderflow { row } => write!(f, "ERROR {} STACK UNDERFLOW", row),
            CalcError::Parse(e) => write!(f, "ERROR {} {}", e.row, e.column),
            // the reference protocol reports a mis-argumented command word the
            // same way as an unknown one
            CalcError::UnrecognizedCommand { row } | CalcError::InvalidArgumentCount { row } => {
                write!(f, "ERROR {} WRONG COMMAND", row)
            }
            CalcError::InvalidArgumentValue { row, arg } => match arg {
                ArgKind::Value => write!(f, "ERROR {} WRONG VALUE", row),
                ArgKind::Variable => write!(f, "ERROR {} WRONG VARIABLE", row),
                ArgKind::Count => write!(f, "ERROR {} WRONG COUNT", row),
            },
        }
    }
}

impl std::error::Error for CalcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalcError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for CalcError {
    fn from(e: ParseError) -> CalcError {
        CalcError::Parse(e)
    }
}

/// The visible result of one command, printed by the session layer as a
/// single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Bool(bool),
    Degree(Exponent),
    Literal(String),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Bool(true) => f.write_str("1"),
            Output::Bool(false) => f.write_str("0"),
            Output::Degree(d) => write!(f, "{}", d),
            Output::Literal(s) => f.write_str(s),
        }
    }
}

/// A calculator session: the evaluation stack plus the current input row.
///
/// Lines are fed one at a time through [`Calculator::process_line`]; a line
/// starting with an ASCII letter is dispatched as a command, anything else is
/// parsed as a polynomial literal and pushed. Every failing operation leaves
/// the stack exactly as it was.
#[derive(Debug, Default)]
pub struct Calculator {
    stack: Stack,
    row: usize,
}

impl Calculator {
    pub fn new() -> Calculator {
        Calculator {
            stack: Stack::new(),
            row: 0,
        }
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// The 1-indexed row of the most recently processed line.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Feeds one input line. `Ok(Some(_))` carries a result to print,
    /// `Ok(None)` means the effect was silent (a push, a pop, a replacement).
    pub fn process_line(&mut self, line: &str) -> Result<Option<Output>, CalcError> {
        self.row += 1;

        match line.bytes().next() {
            Some(c) if c.is_ascii_alphabetic() => self.execute_command(line),
            _ => {
                let p = parser::parse_literal(line, self.row)?;
                self.stack.push(p);
                Ok(None)
            }
        }
    }

    fn execute_command(&mut self, line: &str) -> Result<Option<Output>, CalcError> {
        let (name, arg) = match line.split_once(' ') {
            Some((name, arg)) => (SmartString::<LazyCompact>::from(name), Some(arg)),
            None => (SmartString::<LazyCompact>::from(line), None),
        };
        debug!(row = self.row, command = %name, "executing");

        match (name.as_str(), arg) {
            ("ZERO", None) => {
                self.stack.push(Polynomial::zero());
                Ok(None)
            }
            ("IS_COEFF", None) => Ok(Some(Output::Bool(self.top()?.is_coefficient()))),
            ("IS_ZERO", None) => Ok(Some(Output::Bool(self.top()?.is_zero()))),
            ("CLONE", None) => {
                let p = self.top()?.clone();
                self.stack.push(p);
                Ok(None)
            }
            ("ADD", None) => self.apply2(|a, b| a + b),
            ("MUL", None) => self.apply2(|a, b| a * b),
            ("SUB", None) => self.apply2(|a, b| a - b),
            ("NEG", None) => {
                let p = self.pop()?;
                self.stack.push(-&p);
                Ok(None)
            }
            ("IS_EQ", None) => {
                let first = self.pop()?;
                let eq = match self.stack.top() {
                    Ok(second) => Ok(first == *second),
                    Err(_) => Err(CalcError::StackUnderflow { row: self.row }),
                };
                // both operands stay on the stack
                self.stack.push(first);
                Ok(Some(Output::Bool(eq?)))
            }
            ("DEG", None) => Ok(Some(Output::Degree(self.top()?.total_degree()))),
            ("PRINT", None) => Ok(Some(Output::Literal(self.top()?.to_string()))),
            ("POP", None) => {
                self.pop()?;
                Ok(None)
            }
            ("DEG_BY", Some(arg)) => {
                let var = parser::parse_count(arg, self.row).map_err(|_| {
                    CalcError::InvalidArgumentValue {
                        row: self.row,
                        arg: ArgKind::Variable,
                    }
                })?;
                Ok(Some(Output::Degree(self.top()?.degree_in(var as usize))))
            }
            ("AT", Some(arg)) => {
                let x = parser::parse_coefficient(arg, self.row).map_err(|_| {
                    CalcError::InvalidArgumentValue {
                        row: self.row,
                        arg: ArgKind::Value,
                    }
                })?;
                let p = self.pop()?;
                self.stack.push(p.evaluate(x));
                Ok(None)
            }
            ("COMPOSE", Some(arg)) => {
                let count = parser::parse_count(arg, self.row).map_err(|_| {
                    CalcError::InvalidArgumentValue {
                        row: self.row,
                        arg: ArgKind::Count,
                    }
                })?;
                self.compose(count as usize)
            }
            ("DEG_BY" | "AT" | "COMPOSE", None) => {
                Err(CalcError::InvalidArgumentCount { row: self.row })
            }
            _ => Err(CalcError::UnrecognizedCommand { row: self.row }),
        }
    }

    /// Pops the composed polynomial and then `count` substitution values. The
    /// stack must hold `count + 1` elements before anything is popped. The
    /// value popped last substitutes for the outermost variable.
    fn compose(&mut self, count: usize) -> Result<Option<Output>, CalcError> {
        if self.stack.len() < count.saturating_add(1) {
            return Err(CalcError::StackUnderflow { row: self.row });
        }

        let p = self.pop()?;
        let mut values = match self.stack.pop_many(count) {
            Ok(values) => values,
            Err(e) => {
                self.stack.push(p);
                return Err(CalcError::from_underflow(e, self.row));
            }
        };
        values.reverse();

        self.stack.push(p.compose(&values));
        Ok(None)
    }

    fn top(&self) -> Result<&Polynomial, CalcError> {
        self.stack
            .top()
            .map_err(|e| CalcError::from_underflow(e, self.row))
    }

    fn pop(&mut self) -> Result<Polynomial, CalcError> {
        self.stack
            .pop()
            .map_err(|e| CalcError::from_underflow(e, self.row))
    }

    fn apply2<F>(&mut self, op: F) -> Result<Option<Output>, CalcError>
    where
        F: FnOnce(&Polynomial, &Polynomial) -> Polynomial,
    {
        self.stack
            .apply2(op)
            .map_err(|e| CalcError::from_underflow(e, self.row))?;
        Ok(None)
    }
}

impl CalcError {
    fn from_underflow(_: crate::stack::StackUnderflow, row: usize) -> CalcError {
        CalcError::StackUnderflow { row }
    }
}

/// Runs a whole calculator session: reads `input` line by line, prints command
/// results to `out` and diagnostics to `err`, one line each. Processing always
/// resumes at the next input line after an error.
pub fn run_session<R, W, E>(input: R, out: &mut W, err: &mut E) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut calc = Calculator::new();
    for line in input.lines() {
        let line = line?;
        match calc.process_line(&line) {
            Ok(Some(output)) => writeln!(out, "{}", output)?,
            Ok(None) => {}
            Err(e) => writeln!(err, "{}", e)?,
        }
    }
    Ok(())
}
