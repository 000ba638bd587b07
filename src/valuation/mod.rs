pub mod engine;
pub mod rounding;
