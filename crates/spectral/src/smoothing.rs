//! 1-2-1 smoothing filters.
//!
//! All smoothing in this crate is built from repeated passes of the
//! `[1, 2, 1] / 4` kernel. Two boundary treatments are supported:
//!
//! - **Zero**: samples outside the lane are zero (a "same"-size convolution)
//! - **Reflect**: the edge sample is repeated (`d c b a | a b c d | d c b a`)

use ndarray::{Array2, ArrayBase, Axis, DataMut, Dimension};
use num_traits::Zero;
use std::ops::{Add, Mul};

/// Weights of the 1-2-1 kernel.
pub const KERNEL_121: [f64; 3] = [0.25, 0.5, 0.25];

/// How samples beyond the ends of a lane are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Out-of-range samples are zero.
    Zero,
    /// Out-of-range samples mirror the lane about its edge, repeating the edge sample.
    Reflect,
}

/// Apply one 1-2-1 pass to a lane in place.
///
/// Works for real and complex samples.
pub fn smooth_lane<T>(lane: &mut [T], boundary: Boundary)
where
    T: Copy + Zero + Add<Output = T> + Mul<f64, Output = T>,
{
    let n = lane.len();
    if n == 0 {
        return;
    }

    let src = lane.to_vec();
    for i in 0..n {
        let left = if i > 0 {
            src[i - 1]
        } else {
            edge_value(&src, 0, boundary)
        };
        let right = if i + 1 < n {
            src[i + 1]
        } else {
            edge_value(&src, n - 1, boundary)
        };
        lane[i] = left * KERNEL_121[0] + src[i] * KERNEL_121[1] + right * KERNEL_121[2];
    }
}

#[inline]
fn edge_value<T: Copy + Zero>(src: &[T], edge: usize, boundary: Boundary) -> T {
    match boundary {
        Boundary::Zero => T::zero(),
        Boundary::Reflect => src[edge],
    }
}

/// Apply `passes` 1-2-1 passes along `axis` of an array or view, in place.
pub fn smooth_axis<S, T, D>(arr: &mut ArrayBase<S, D>, axis: Axis, passes: usize, boundary: Boundary)
where
    S: DataMut<Elem = T>,
    T: Copy + Zero + Add<Output = T> + Mul<f64, Output = T>,
    D: Dimension,
{
    if passes == 0 {
        return;
    }

    for mut lane in arr.lanes_mut(axis) {
        let mut buf: Vec<T> = lane.iter().copied().collect();
        for _ in 0..passes {
            smooth_lane(&mut buf, boundary);
        }
        for (dst, src) in lane.iter_mut().zip(buf) {
            *dst = src;
        }
    }
}

/// Smooth each row of a 2-D array with `num_of_pass` zero-boundary 1-2-1 passes.
pub fn gaussian_filter(arr: &Array2<f64>, num_of_pass: usize) -> Array2<f64> {
    let mut smoothed = arr.clone();
    smooth_axis(&mut smoothed, Axis(1), num_of_pass, Boundary::Zero);
    smoothed
}
