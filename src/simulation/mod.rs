//! Synthetic data for benchmarks and stress tests.

pub mod synthetic;
