//! Shared vocabulary for the diary crates: domain types, the error taxonomy
//! and the collaborator ports the editing and viewing core talks through.

pub mod error;
pub mod model;
pub mod ports;
pub mod result;

pub use error::*;
pub use model::*;
pub use ports::*;
pub use result::*;
