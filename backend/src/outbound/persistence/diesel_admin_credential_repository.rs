//! PostgreSQL-backed `AdminCredentialRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::PasswordDigest;
use crate::domain::ports::{AdminCredentialError, AdminCredentialRepository};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::admin_users;

/// Reads admin password digests from `admin_users`.
#[derive(Clone)]
pub struct DieselAdminCredentialRepository {
    pool: DbPool,
}

impl DieselAdminCredentialRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminCredentialError {
    map_basic_pool_error(error, AdminCredentialError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AdminCredentialError {
    map_basic_diesel_error(
        error,
        AdminCredentialError::query,
        AdminCredentialError::connection,
    )
}

#[async_trait]
impl AdminCredentialRepository for DieselAdminCredentialRepository {
    async fn password_digest(
        &self,
        username: &str,
    ) -> Result<Option<PasswordDigest>, AdminCredentialError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: Option<String> = admin_users::table
            .filter(admin_users::username.eq(username))
            .select(admin_users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(stored.map(PasswordDigest::from_hex))
    }
}
