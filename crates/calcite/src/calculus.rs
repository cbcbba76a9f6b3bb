pub mod differentiation;
pub mod integration;

pub use differentiation::derivative;
pub use integration::{Integral, IntegrateError, SUBINTERVALS, integrate, trapezoid};
