//! Ordering helpers for keeping page numbers and image ids in range.
//!
//! These work on anything `PartialOrd + Copy`, so the same functions serve
//! signed page numbers parsed from a query string, `usize` ids, floats, and
//! string slices.

/// The smaller of two values. Returns `b` when they compare equal.
pub fn min<T: PartialOrd + Copy>(a: T, b: T) -> T {
    if a < b { a } else { b }
}

/// The larger of two values. Returns `b` when they compare equal.
pub fn max<T: PartialOrd + Copy>(a: T, b: T) -> T {
    if a > b { a } else { b }
}

/// Clamp `value` into `[lo, hi]`.
///
/// Computed as `min(max(value, lo), hi)`. When `lo > hi` the range is empty
/// and the result is `hi`; callers with a possibly-empty range (an empty
/// index has zero pages) must handle that case before clamping.
pub fn clamp<T: PartialOrd + Copy>(value: T, lo: T, hi: T) -> T {
    min(max(value, lo), hi)
}
