pub mod polynomial;

/// The scalar type at the bottom of the coefficient recursion.
///
/// Coefficient arithmetic wraps on overflow: every literal is range checked on
/// input, so two's-complement wraparound during evaluation matches the
/// calculator's documented behavior instead of aborting.
pub type Coefficient = i64;

/// The exponent of a single monomial. Always non-negative on canonical values.
pub type Exponent = i32;

/// The largest exponent the parser accepts.
pub const EXP_MAX: Exponent = i32::MAX;

/// Stack-inlined size of the transient monomial buffers built during
/// multiplication and literal parsing.
pub const INLINED_TERMS: usize = 6;
