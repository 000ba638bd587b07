pub mod conversion;
pub mod grouping;
pub mod maturity;
pub mod summary;
