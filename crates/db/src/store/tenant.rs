//! Class tenant policy store.

use std::sync::Arc;

use mlkids_core::tenant::{
    class_from_row, class_to_row, create_class_tenant, default_class_tenant, ClassTenant,
};

use crate::backend::TenantBackend;
use crate::error::StoreError;

pub struct TenantPolicyStore<B> {
    backend: Arc<B>,
}

impl<B> Clone for TenantPolicyStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: TenantBackend> TenantPolicyStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Create (or reset) a class with the default policy.
    pub async fn store_class_tenant(&self, classid: &str) -> Result<ClassTenant, StoreError> {
        let row = create_class_tenant(classid)?;
        self.backend.upsert_tenant(&row).await?;
        tracing::info!(class_id = %classid, "Class tenant stored");
        Ok(class_from_row(row)?)
    }

    /// Replace the stored policy of a class.
    pub async fn update_class_tenant(&self, tenant: &ClassTenant) -> Result<(), StoreError> {
        // Reuse the id checks of tenant creation.
        create_class_tenant(&tenant.id)?;
        self.backend.upsert_tenant(&class_to_row(tenant)).await?;
        tracing::info!(class_id = %tenant.id, "Class tenant updated");
        Ok(())
    }

    /// The stored policy, or the default policy when the class has none.
    pub async fn get_class_tenant(&self, classid: &str) -> Result<ClassTenant, StoreError> {
        match self.backend.select_tenant(classid).await? {
            Some(row) => Ok(class_from_row(row)?),
            None => {
                tracing::debug!(class_id = %classid, "No stored tenant, using default policy");
                Ok(default_class_tenant(classid))
            }
        }
    }

    pub async fn delete_class_tenant(&self, classid: &str) -> Result<u64, StoreError> {
        self.backend.delete_tenant(classid).await
    }
}
