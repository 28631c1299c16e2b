//! Service credentials store.

use std::sync::Arc;

use mlkids_core::credentials::{
    credentials_from_row, credentials_to_row, BluemixCredentials, ServiceType,
};
use mlkids_core::ObjectFactory;

use crate::backend::CredentialsBackend;
use crate::error::StoreError;

pub struct CredentialsStore<B> {
    backend: Arc<B>,
    factory: ObjectFactory,
}

impl<B> Clone for CredentialsStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            factory: self.factory.clone(),
        }
    }
}

impl<B: CredentialsBackend> CredentialsStore<B> {
    pub fn new(backend: Arc<B>, factory: ObjectFactory) -> Self {
        Self { backend, factory }
    }

    pub async fn store_bluemix_credentials(
        &self,
        servicetype: &str,
        classid: &str,
        apikey: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<BluemixCredentials, StoreError> {
        let creds = self
            .factory
            .create_bluemix_credentials(servicetype, classid, apikey, username, password)?;
        self.backend
            .insert_credentials(&credentials_to_row(&creds))
            .await?;
        tracing::info!(class_id = %classid, servicetype, "Credentials stored");
        Ok(creds)
    }

    /// A class's credentials for one service, oldest first.
    pub async fn get_bluemix_credentials(
        &self,
        classid: &str,
        servicetype: ServiceType,
    ) -> Result<Vec<BluemixCredentials>, StoreError> {
        let rows = self
            .backend
            .select_credentials(classid, servicetype.as_str())
            .await?;
        Ok(rows
            .into_iter()
            .map(credentials_from_row)
            .collect::<Result<_, _>>()?)
    }

    pub async fn delete_bluemix_credentials(&self, id: &str) -> Result<u64, StoreError> {
        self.backend.delete_credentials(id).await
    }
}
