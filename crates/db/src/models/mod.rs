//! Database row models.
//!
//! Rows derive `FromRow` and convert into the domain types of
//! `mediavault_core::media`.

pub mod artifact;
pub mod bundle;
pub mod media;
