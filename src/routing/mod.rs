//! Request routing: the prefix handler chain and virtual-host root selection.

pub mod chain;
pub mod host;

pub use chain::{Handler, RegistrationError, Router, RouterBuilder};
pub use host::{select_root, RootSelection};
