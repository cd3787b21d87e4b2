mod logistic;
mod softplus;

pub use logistic::Logistic;
pub use softplus::Softplus;
