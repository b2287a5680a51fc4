// src/services/master_data_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MasterDataRepository,
    models::master_data::{CreateLookupPayload, LookupItem, LookupKind, UpdateLookupPayload},
};

#[derive(Clone)]
pub struct MasterDataService {
    repo: MasterDataRepository,
}

impl MasterDataService {
    pub fn new(repo: MasterDataRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<LookupItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, kind, tenant_id, active_only).await
    }

    pub async fn get<'e, E>(&self, executor: E, kind: LookupKind, tenant_id: Uuid, id: Uuid) -> Result<LookupItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, kind, tenant_id, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(kind.label().into()))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        payload: &CreateLookupPayload,
    ) -> Result<LookupItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create(executor, kind, tenant_id, payload).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        kind: LookupKind,
        tenant_id: Uuid,
        id: Uuid,
        payload: &UpdateLookupPayload,
    ) -> Result<LookupItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update(executor, kind, tenant_id, id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(kind.label().into()))
    }

    pub async fn delete<'e, E>(&self, executor: E, kind: LookupKind, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete(executor, kind, tenant_id, id).await? {
            return Err(AppError::ResourceNotFound(kind.label().into()));
        }
        Ok(())
    }
}
