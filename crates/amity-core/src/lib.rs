//! Core domain engine for the `amity` social backend: account lifecycle,
//! one-time codes, session tokens, and the directed follow graph.
//!
//! No HTTP and no database client live here. Persistence is the
//! [`store::SocialStore`] trait; each backend sits in its own crate.

pub mod account;
pub mod edge;
pub mod error;
pub mod graph;
pub mod lifecycle;
pub mod memory;
pub mod otp;
pub mod store;
pub mod token;


pub use error::{Error, ErrorKind, Result};
