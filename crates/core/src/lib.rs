//! Domain core for versioned media entities.
//!
//! Everything in this crate is storage-agnostic: the save pipeline and the
//! submission workflow talk to persistence only through the traits in
//! [`media::storage`]. The PostgreSQL implementation lives in `mediavault-db`.

pub mod context;
pub mod error;
pub mod media;
pub mod roles;
pub mod types;
