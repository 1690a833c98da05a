#[macro_use]
extern crate tracing;

mod artifact;

pub use artifact::*;
