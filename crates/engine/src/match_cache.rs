//! Potential-match cache store — one row of scored candidates per resource.
//!
//! Written by the matching engine whenever candidates are recomputed and
//! read by notification/UI flows. An upsert replaces the whole list in one
//! statement, so no reader observes a partially written set; the primary
//! key on `resource_id` enforces the one-entry-per-resource invariant.

use sqlx::PgPool;
use uuid::Uuid;

use courier_common::error::AppError;
use courier_common::types::{PotentialMatch, PotentialMatchCacheEntry};

pub struct MatchCacheStore;

impl MatchCacheStore {
    /// Replace the candidate list for a resource, creating the row on first
    /// write. Sets `last_cache_update` to the statement time.
    pub async fn upsert(
        pool: &PgPool,
        resource_id: Uuid,
        matches: &[PotentialMatch],
    ) -> Result<PotentialMatchCacheEntry, AppError> {
        let entry: PotentialMatchCacheEntry = sqlx::query_as(
            r#"
            INSERT INTO potential_match_cache (resource_id, potential_matches, last_cache_update)
            VALUES ($1, $2, now())
            ON CONFLICT (resource_id) DO UPDATE
            SET potential_matches = EXCLUDED.potential_matches,
                last_cache_update = EXCLUDED.last_cache_update
            RETURNING *
            "#,
        )
        .bind(resource_id)
        .bind(sqlx::types::Json(matches))
        .fetch_one(pool)
        .await?;

        tracing::debug!(
            resource_id = %resource_id,
            candidates = matches.len(),
            "Potential match cache updated"
        );

        Ok(entry)
    }

    /// Read the cached candidate list for a resource.
    ///
    /// Consistent with the most recent completed upsert.
    pub async fn get(pool: &PgPool, resource_id: Uuid) -> Result<PotentialMatchCacheEntry, AppError> {
        let entry: PotentialMatchCacheEntry =
            sqlx::query_as("SELECT * FROM potential_match_cache WHERE resource_id = $1")
                .bind(resource_id)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("No cached matches for resource {}", resource_id))
                })?;

        Ok(entry)
    }
}
