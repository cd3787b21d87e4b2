use ndarray::ArrayView2;

/// Scores predictions against targets, lower is better.
///
/// Both arrays hold one sample per column.
pub trait LossFn {
    fn loss(&self, y_pred: ArrayView2<f64>, y: ArrayView2<f64>) -> f64;
}
