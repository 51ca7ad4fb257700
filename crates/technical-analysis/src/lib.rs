pub mod indicators;
pub mod scoring;

#[cfg(test)]
mod test_support;

pub use indicators::*;
pub use scoring::*;
