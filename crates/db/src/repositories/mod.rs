//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod credentials_repo;
pub mod project_repo;
pub mod tenant_repo;
pub mod training_repo;

pub use credentials_repo::CredentialsRepo;
pub use project_repo::ProjectRepo;
pub use tenant_repo::TenantRepo;
pub use training_repo::{TrainingRepo, TrainingTable};
