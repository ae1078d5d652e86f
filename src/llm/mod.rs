pub mod advisor;
pub mod client;
pub mod speech;
pub mod types;

pub use advisor::*;
pub use client::*;
pub use speech::*;
pub use types::*;
