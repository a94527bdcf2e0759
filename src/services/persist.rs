//! Single-entity unit-of-work helpers shared by the catalog services.
//!
//! Each helper stages one operation on a request-scoped repository and
//! commits it immediately.

use crate::error::{AppError, AppResult};
use crate::repositories::{Entity, Repository};

/// Stages `new`, commits, and returns the row with its assigned id.
pub(crate) async fn insert_one<E, R>(repo: &mut R, new: E::New) -> AppResult<E>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    repo.add(new);
    let summary = repo.save_changes().await?;
    summary
        .inserted
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal {
            source: anyhow::anyhow!("insert of {} returned no row", E::NAME),
        })
}

/// Replaces an existing row.
///
/// A conflict at commit time becomes `NotFound` when the row is gone and is
/// returned unchanged otherwise.
pub(crate) async fn update_one<E, R>(repo: &mut R, entity: E) -> AppResult<()>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let id = entity.id();
    repo.update(entity);
    match repo.save_changes().await {
        Ok(_) => Ok(()),
        Err(conflict @ AppError::ConcurrencyConflict { .. }) => {
            if repo.get_by_id(id).await?.is_none() {
                Err(AppError::not_found(E::NAME, id))
            } else {
                Err(conflict)
            }
        }
        Err(e) => Err(e),
    }
}

/// Looks the row up, then deletes it. Absent rows fail with `NotFound`,
/// including a row removed between the lookup and the commit.
pub(crate) async fn delete_by_id<E, R>(repo: &mut R, id: i32) -> AppResult<()>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let entity = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(E::NAME, id))?;

    repo.delete(entity);
    match repo.save_changes().await {
        Ok(_) => Ok(()),
        Err(AppError::ConcurrencyConflict { .. }) => Err(AppError::not_found(E::NAME, id)),
        Err(e) => Err(e),
    }
}

/// Fails with `NotFound` unless a row with `id` exists.
pub(crate) async fn require_exists<E, R>(repo: &R, id: i32) -> AppResult<()>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    match repo.get_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found(E::NAME, id)),
    }
}
