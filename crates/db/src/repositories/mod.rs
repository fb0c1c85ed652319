//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod artifact_repo;
pub mod bundle_repo;
pub mod media_repo;

pub use artifact_repo::ArtifactRepo;
pub use bundle_repo::BundleRepo;
pub use media_repo::{MediaRepo, RevisionWrite};
