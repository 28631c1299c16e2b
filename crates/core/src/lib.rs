//! Record construction and validation for ML-for-kids projects.
//!
//! Everything here is pure: no I/O, no logging. Callers build validated
//! rows through [`ObjectFactory`] and hand them to the stores in
//! `mlkids-db`; rows read back from storage are reshaped by the
//! `*_from_row` mappers.

pub mod credentials;
pub mod error;
pub mod factory;
pub mod ids;
pub mod labels;
pub mod limits;
pub mod project;
pub mod tenant;
pub mod training;
pub mod types;

pub use error::CoreError;
pub use factory::ObjectFactory;
