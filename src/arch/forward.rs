//! The network's forward pass.
//!
//! hidden = softplus(hidden_bias + hidden_weights · x)
//! output = logistic(output_bias + output_weights · hidden)
//!
//! Both functions only borrow the snapshot. Single-sample evaluation goes through the batched
//! path so training and prediction can never disagree.

use ndarray::{Array2, ArrayView2};

use super::activations::{Logistic, Softplus};
use crate::params::{INPUTS, OUTPUTS, ParamSnapshot};

/// Evaluates a batch of inputs.
///
/// # Arguments
/// * `snapshot` - The parameters to evaluate with.
/// * `inputs` - Scaled inputs with shape `(3, n)`, one sample per column.
///
/// # Returns
/// The predictions with shape `(2, n)`: row 0 is the dark-font channel, row 1 the light-font one.
///
/// Panics if `inputs` does not have 3 rows.
pub fn evaluate(snapshot: &ParamSnapshot, inputs: ArrayView2<f64>) -> Array2<f64> {
    assert_eq!(inputs.nrows(), INPUTS, "inputs must have one row per channel");

    let hidden = (snapshot.hidden_weights.dot(&inputs) + &snapshot.hidden_bias)
        .mapv_into(Softplus::f);

    (snapshot.output_weights.dot(&hidden) + &snapshot.output_bias).mapv_into(Logistic::f)
}

/// Evaluates a single scaled `(r, g, b)` sample.
pub fn evaluate_one(snapshot: &ParamSnapshot, input: [f64; INPUTS]) -> [f64; OUTPUTS] {
    let column = Array2::from_shape_fn((INPUTS, 1), |(row, _)| input[row]);
    let out = evaluate(snapshot, column.view());
    [out[[0, 0]], out[[1, 0]]]
}
