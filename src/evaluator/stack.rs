//! Stack growth for the evaluator's host recursion.
//!
//! Operands, sequence elements and the bodies run by `map`/`filter`/`reduce` are
//! evaluated recursively, so a non-tail recursive program such as a naive factorial
//! nests one host frame per call. Each recursive entry goes through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated segment when
//! the current one runs low.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
