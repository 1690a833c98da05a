//! Custom middleware definitions

mod identity;

pub use identity::IdentityLayer;
