use std::fmt;

use crate::poly::polynomial::Polynomial;

/// An operation needed more stack elements than were available. The stack is
/// guaranteed to be exactly as it was before the operation was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackUnderflow;

impl fmt::Display for StackUnderflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("stack underflow")
    }
}

impl std::error::Error for StackUnderflow {}

/// The evaluation stack: a growable LIFO sequence owning every polynomial on
/// it. `push` and `pop` transfer ownership in and out.
#[derive(Debug, Default)]
pub struct Stack {
    elements: Vec<Polynomial>,
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            elements: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn push(&mut self, p: Polynomial) {
        self.elements.push(p);
    }

    pub fn top(&self) -> Result<&Polynomial, StackUnderflow> {
        self.elements.last().ok_or(StackUnderflow)
    }

    pub fn pop(&mut self) -> Result<Polynomial, StackUnderflow> {
        self.elements.pop().ok_or(StackUnderflow)
    }

    /// Pops two operands, applies the borrowing binary operation `op` with the
    /// popped top as the left operand, drops both operands and pushes the
    /// result. On underflow at the second pop the first operand is pushed
    /// back, so a failed call leaves the stack untouched.
    pub fn apply2<F>(&mut self, op: F) -> Result<(), StackUnderflow>
    where
        F: FnOnce(&Polynomial, &Polynomial) -> Polynomial,
    {
        let first = self.pop()?;
        let second = match self.pop() {
            Ok(p) => p,
            Err(e) => {
                self.push(first);
                return Err(e);
            }
        };

        let result = op(&first, &second);
        self.push(result);
        Ok(())
    }

    /// Pops `n` elements at once, topmost first. Availability is checked
    /// before anything is popped, so a failed call leaves the stack untouched.
    pub fn pop_many(&mut self, n: usize) -> Result<Vec<Polynomial>, StackUnderflow> {
        if self.elements.len() < n {
            return Err(StackUnderflow);
        }

        let split = self.elements.len() - n;
        Ok(self.elements.drain(split..).rev().collect())
    }
}
