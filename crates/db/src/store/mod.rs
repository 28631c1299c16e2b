//! Validated stores.
//!
//! Each store owns an [`ObjectFactory`](mlkids_core::ObjectFactory) and a
//! shared backend. Input is validated before any backend call, and reads
//! are mapped back into domain records.

pub mod credentials;
pub mod project;
pub mod tenant;
pub mod training;

pub use credentials::CredentialsStore;
pub use project::ProjectStore;
pub use tenant::TenantPolicyStore;
pub use training::TrainingStore;
