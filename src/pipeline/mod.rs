//! Enhancement pipeline: bulk and streaming entry points.

pub mod cache;
pub mod enhancer;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ParseCache;
pub use enhancer::{Enhancer, EnhancerBuilder, EnhanceReport};
