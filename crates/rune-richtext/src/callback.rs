//! Borrowed, call-scoped callbacks.
//!
//! Public entry points are generic over the caller's closure type, but the
//! line-breaking loop behind them is compiled once. [`CallbackRef`] is the
//! bridge: it borrows the closure as a trait object for the duration of the
//! call, without boxing it and without being `Clone` or `Copy`.

use core::marker::PhantomData;

/// A mutable borrow of a caller-supplied closure.
///
/// The lifetime ties the reference to the stack frame that created it, so it
/// cannot outlive the call it was created for. The `*const ()` marker keeps
/// it `!Send` and `!Sync` like the single-threaded call it serves.
pub struct CallbackRef<'a, F: ?Sized> {
    func: &'a mut F,
    _local: PhantomData<*const ()>,
}

/// Per-line width negotiation: `(line_number, accumulated_height) -> width`.
pub type LineWidthFn<'a> = CallbackRef<'a, dyn FnMut(usize, f32) -> f32 + 'a>;

/// Per-line horizontal offset: `line_number -> x offset`.
pub type LineOffsetFn<'a> = CallbackRef<'a, dyn FnMut(usize) -> f32 + 'a>;

impl<'a> CallbackRef<'a, dyn FnMut(usize, f32) -> f32 + 'a> {
    pub fn new<C: FnMut(usize, f32) -> f32 + 'a>(func: &'a mut C) -> Self {
        Self {
            func,
            _local: PhantomData,
        }
    }

    pub fn call(&mut self, line: usize, accumulated_height: f32) -> f32 {
        (self.func)(line, accumulated_height)
    }
}

impl<'a> CallbackRef<'a, dyn FnMut(usize) -> f32 + 'a> {
    pub fn new<C: FnMut(usize) -> f32 + 'a>(func: &'a mut C) -> Self {
        Self {
            func,
            _local: PhantomData,
        }
    }

    pub fn call(&mut self, line: usize) -> f32 {
        (self.func)(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_widths(mut widths: LineWidthFn<'_>, lines: usize) -> f32 {
        (0..lines).map(|line| widths.call(line, line as f32 * 10.0)).sum()
    }

    #[test]
    fn forwards_arguments_and_results() {
        let mut seen = Vec::new();
        let mut provider = |line: usize, height: f32| {
            seen.push((line, height));
            100.0 - height
        };
        let total = sum_widths(LineWidthFn::new(&mut provider), 3);
        assert_eq!(total, 100.0 + 90.0 + 80.0);
        assert_eq!(seen, vec![(0, 0.0), (1, 10.0), (2, 20.0)]);
    }

    #[test]
    fn offset_callback_mutates_captured_state() {
        let mut calls = 0;
        let mut offsets = |line: usize| {
            calls += 1;
            line as f32 * 2.0
        };
        let mut bridge = LineOffsetFn::new(&mut offsets);
        assert_eq!(bridge.call(0), 0.0);
        assert_eq!(bridge.call(4), 8.0);
        drop(bridge);
        assert_eq!(calls, 2);
    }
}
