pub mod domain;
pub mod error;
pub mod location;
pub mod protocol;
