//! Data models

pub mod observation;
pub mod prediction;
pub mod stream;

pub use observation::*;
pub use prediction::*;
pub use stream::*;
