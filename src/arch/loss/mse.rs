use ndarray::ArrayView2;

use super::LossFn;

/// Squared error summed over both output channels and averaged over samples.
#[derive(Default, Clone, Copy, Debug)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> f64 {
        debug_assert_eq!(y_pred.dim(), y.dim());

        let samples = y.ncols();
        if samples == 0 {
            return 0.;
        }

        (&y - &y_pred).mapv(|x| x.powi(2)).sum() / samples as f64
    }
}
