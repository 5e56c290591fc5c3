//! Interactive front end for the component inventory.
//!
//! The dispatcher turns command lines into calls on a [`Session`]; the REPL
//! drives it over any reader/writer pair.
//!
//! [`Session`]: partstock_inventory::Session

pub mod config;
pub mod dispatcher;
pub mod render;
pub mod repl;

pub use config::Config;
pub use dispatcher::{Command, CommandError, Outcome};
