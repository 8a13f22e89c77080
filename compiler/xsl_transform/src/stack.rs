//! Stack growth guard for recursive tree copies.
//!
//! Deep copies recurse once per tree level. Source documents nested a few
//! hundred thousand levels deep would exhaust a default thread stack, so each
//! level runs through [`ensure_sufficient_stack`].

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// WASM manages its own stack; there the closure is called directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Grow when less than this remains (128KB).
    const RED_ZONE: usize = 128 * 1024;

    /// Size of each new stack segment (1MB).
    const GROWTH: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, GROWTH, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
