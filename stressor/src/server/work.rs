//! CPU burning kernels
//!
//! Deliberately naive: the point is to spend cycles, not to compute fast.

use std::hint::black_box;

/// Safety net for the Babylonian loop, which converges in a handful of steps
const MAX_SQRT_STEPS: u32 = 64;

/// Square root by the Babylonian method
pub fn babylonian_sqrt(n: f64) -> f64 {
    let mut x = n;
    let mut y = 1.0;
    let mut steps = 0;

    while x > y && steps < MAX_SQRT_STEPS {
        x = (x + y) / 2.0;
        y = n / x;
        steps += 1;
    }

    x
}

/// Compute sqrt(2) `iterations` times
pub fn burn_sqrt2(iterations: u64) {
    for _ in 0..iterations {
        black_box(babylonian_sqrt(black_box(2.0)));
    }
}

/// Largest `n` whose Fibonacci number fits in a `u64`
pub const MAX_FIBO_N: u64 = 93;

/// Doubly recursive Fibonacci; recursion depth is `n`, callers bound it by
/// [`MAX_FIBO_N`]
pub fn fibo(n: u64) -> u64 {
    if n <= 1 {
        return n;
    }
    fibo(n - 1).wrapping_add(fibo(n - 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_babylonian_sqrt_two() {
        let root = babylonian_sqrt(2.0);
        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_babylonian_sqrt_small_inputs() {
        assert_eq!(babylonian_sqrt(1.0), 1.0);
        // x <= y from the start, nothing to iterate
        assert_eq!(babylonian_sqrt(0.5), 0.5);
    }

    #[test]
    fn test_fibo_values() {
        assert_eq!(fibo(0), 0);
        assert_eq!(fibo(1), 1);
        assert_eq!(fibo(9), 34);
        assert_eq!(fibo(20), 6765);
    }

    #[test]
    fn test_max_fibo_n_is_last_value_fitting_u64() {
        let mut values = vec![0u64, 1];
        while let Some(next) = values[values.len() - 1].checked_add(values[values.len() - 2]) {
            values.push(next);
        }
        assert_eq!(values.len() as u64 - 1, MAX_FIBO_N);
    }

    #[test]
    fn test_burn_sqrt2_zero_iterations() {
        burn_sqrt2(0);
        burn_sqrt2(1000);
    }
}
