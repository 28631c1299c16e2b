//! The record factory: turns raw client input into validated records.
//!
//! Construction methods live next to the record types they build
//! ([`project`](crate::project), [`training`](crate::training),
//! [`credentials`](crate::credentials)). The factory itself only owns the
//! validation limits and the id source, so tests can swap in
//! [`SequentialIds`](crate::ids::SequentialIds).

use std::sync::Arc;

use crate::ids::{IdGenerator, UuidIds};
use crate::limits::ObjectLimits;

#[derive(Clone)]
pub struct ObjectFactory {
    limits: ObjectLimits,
    ids: Arc<dyn IdGenerator>,
}

impl ObjectFactory {
    pub fn new(limits: ObjectLimits, ids: Arc<dyn IdGenerator>) -> Self {
        Self { limits, ids }
    }

    pub fn limits(&self) -> &ObjectLimits {
        &self.limits
    }

    pub(crate) fn next_id(&self) -> String {
        self.ids.next_id()
    }
}

impl Default for ObjectFactory {
    fn default() -> Self {
        Self::new(ObjectLimits::default(), Arc::new(UuidIds))
    }
}

impl std::fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
