//! Synthetic portfolios for benchmarking and exploratory runs.

pub mod portfolio_generator;
