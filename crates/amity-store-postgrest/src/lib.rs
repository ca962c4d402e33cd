//! PostgREST backend for the amity record store.
//!
//! Speaks the PostgREST filter dialect over HTTP: equality filters, an
//! `or=(and(..),and(..))` probe for the pair check, and writes carrying
//! `Prefer: return=representation` so every conditional update reports its
//! affected rows in the response body.

mod client;
mod store;
mod wire;

pub mod error;

pub use client::PostgrestConfig;
pub use error::{Error, Result};
pub use store::PostgrestStore;
