/// Smooth ramp `ln(1 + e^x)`, the hidden layer's activation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Softplus;

impl Softplus {
    /// Evaluates in the rearranged form `max(x, 0) + ln(1 + e^-|x|)`, which never
    /// exponentiates a positive number.
    #[inline]
    pub fn f(x: f64) -> f64 {
        x.max(0.) + (-x.abs()).exp().ln_1p()
    }
}
