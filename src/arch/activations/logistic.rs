/// Sigmoid `1 / (1 + e^-x)`, squashing the output layer into `(0, 1)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Logistic;

impl Logistic {
    #[inline]
    pub fn f(x: f64) -> f64 {
        if x >= 0. {
            1. / (1. + (-x).exp())
        } else {
            let z = x.exp();
            z / (1. + z)
        }
    }
}
