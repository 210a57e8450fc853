//! This module contains the pure 2x2 block-averaging kernel.
//!
//! Every output cell `(r, c)` is the mean of the input block whose top-left
//! corner sits at `(2r, 2c)`. An odd trailing row or column has no partner and
//! is cropped rather than padded, so no synthetic values enter the output.

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// Shape of the downsampled matrix for an input of `(rows, cols)`.
#[inline]
pub fn downsampled_shape(rows: usize, cols: usize) -> (usize, usize) {
    (rows / 2, cols / 2)
}

/// Averages each 2x2 block of `input` into the matching cell of `output`.
///
/// `output` must have exactly `downsampled_shape(input.dim())` shape; the caller
/// sizes both matrices from the same row layout.
pub fn downsample_into(input: ArrayView2<'_, f32>, mut output: ArrayViewMut2<'_, f32>) {
    debug_assert_eq!(
        output.dim(),
        downsampled_shape(input.nrows(), input.ncols()),
        "downsample target has the wrong shape"
    );

    for ((r, c), cell) in output.indexed_iter_mut() {
        let (r2, c2) = (2 * r, 2 * c);
        let a = input[[r2, c2]];
        let b = input[[r2, c2 + 1]];
        let c_ = input[[r2 + 1, c2]];
        let d = input[[r2 + 1, c2 + 1]];
        *cell = (a + b + c_ + d) / 4.0;
    }
}

/// Allocates a half-resolution matrix and fills it from `input`.
pub fn downsample_2x2(input: ArrayView2<'_, f32>) -> Array2<f32> {
    let mut output = Array2::<f32>::zeros(downsampled_shape(input.nrows(), input.ncols()));
    downsample_into(input, output.view_mut());
    output
}
