//! `SQLite` implementation of the `MemeRepository` trait.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Row, Sqlite, SqlitePool, sqlite::SqliteRow};
use tracing::{self, info};
use url::Url;

use crate::{
    domain::MemeRepository,
    errors::RepoError,
    models::{Meme, MemeFilter, MemeImage, MemeSource, NewMeme},
};

/// Shared SELECT column list for meme queries.
const MEME_COLUMNS: &str = "id, description, image_url, image_width, image_height, rating, source";

/// Stores memes in the single `memes` table.
///
/// Each call checks out its own connection (reads) or transaction (writes)
/// from the pool. Both are returned on drop, and a transaction that is
/// dropped without `commit` rolls back, so every exit path releases them.
#[derive(Debug, Clone)]
pub struct SqliteMemeRepository {
    pool: SqlitePool,
}

impl SqliteMemeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        info!("Initializing SqliteMemeRepository");
        Self { pool }
    }
}

#[async_trait]
impl MemeRepository for SqliteMemeRepository {
    async fn list_all(&self, filter: &MemeFilter) -> Result<Vec<Meme>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("SQLite: Failed to acquire connection to list memes")?;

        let query = format!(
            r"SELECT {MEME_COLUMNS} FROM memes
              WHERE (?1 IS NULL OR source = ?1)
                AND (?2 IS NULL OR description LIKE ?2 ESCAPE '\')
              ORDER BY id"
        );
        let rows = sqlx::query(&query)
            .bind(filter.source.map(MemeSource::as_str))
            .bind(filter.q.as_deref().map(like_pattern))
            .fetch_all(&mut *conn)
            .await
            .context("SQLite: Failed to list memes")?;

        tracing::debug!("SQLite: Listed {} memes", rows.len());
        rows.iter().map(row_to_meme).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Meme>, RepoError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .with_context(|| format!("SQLite: Failed to acquire connection to get meme (id: {id})"))?;

        let row = sqlx::query(&format!("SELECT {MEME_COLUMNS} FROM memes WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .with_context(|| format!("SQLite: Failed to get meme (id: {id})"))?;

        row.as_ref().map(row_to_meme).transpose()
    }

    async fn create(&self, meme: &NewMeme) -> Result<Meme, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("SQLite: Failed to begin transaction to create meme")?;

        let result = sqlx::query(
            "INSERT INTO memes (description, image_url, image_width, image_height, rating, source)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&meme.description)
        .bind(meme.image.url.as_str())
        .bind(meme.image.width.map(i64::from))
        .bind(meme.image.height.map(i64::from))
        .bind(meme.rating.map(i64::from))
        .bind(meme.source.map(MemeSource::as_str))
        .execute(&mut *tx)
        .await
        .context("SQLite: Failed to insert meme")?;

        let id = result.last_insert_rowid();
        tx.commit()
            .await
            .with_context(|| format!("SQLite: Failed to commit new meme (id: {id})"))?;

        tracing::debug!(meme_id = id, "SQLite: Stored meme");
        Ok(meme.clone().into_meme(id))
    }

    async fn update(&self, id: i64, meme: &NewMeme) -> Result<Option<Meme>, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .with_context(|| format!("SQLite: Failed to begin transaction to update meme (id: {id})"))?;

        let result = sqlx::query(
            "UPDATE memes
             SET description = ?, image_url = ?, image_width = ?, image_height = ?, rating = ?, source = ?
             WHERE id = ?",
        )
        .bind(&meme.description)
        .bind(meme.image.url.as_str())
        .bind(meme.image.width.map(i64::from))
        .bind(meme.image.height.map(i64::from))
        .bind(meme.rating.map(i64::from))
        .bind(meme.source.map(MemeSource::as_str))
        .bind(id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("SQLite: Failed to update meme (id: {id})"))?;

        if result.rows_affected() == 0 {
            tracing::debug!(meme_id = id, "SQLite: No meme to update");
            return Ok(None);
        }

        tx.commit()
            .await
            .with_context(|| format!("SQLite: Failed to commit update of meme (id: {id})"))?;

        tracing::debug!(meme_id = id, "SQLite: Replaced meme");
        Ok(Some(meme.clone().into_meme(id)))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .with_context(|| format!("SQLite: Failed to begin transaction to delete meme (id: {id})"))?;

        let result = sqlx::query("DELETE FROM memes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("SQLite: Failed to delete meme (id: {id})"))?;

        tx.commit()
            .await
            .with_context(|| format!("SQLite: Failed to commit delete of meme (id: {id})"))?;

        let removed = result.rows_affected() > 0;
        tracing::debug!(meme_id = id, removed, "SQLite: Delete processed");
        Ok(removed)
    }
}

/// Builds a `LIKE` pattern that matches `needle` literally anywhere in the text.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, RepoError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepoError::DataCorruption(format!("column '{name}': {e}")))
}

fn positive_u32(id: i64, name: &str, value: Option<i64>) -> Result<Option<u32>, RepoError> {
    value
        .map(|v| match u32::try_from(v) {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(RepoError::DataCorruption(format!(
                "meme {id}: {name} {v} is not a positive integer"
            ))),
        })
        .transpose()
}

/// Parse a database row into a Meme.
fn row_to_meme(row: &SqliteRow) -> Result<Meme, RepoError> {
    let id: i64 = column(row, "id")?;

    let image_url: String = column(row, "image_url")?;
    let url = Url::parse(&image_url).map_err(|e| {
        RepoError::DataCorruption(format!("meme {id}: invalid image_url '{image_url}': {e}"))
    })?;

    let rating = column::<Option<i64>>(row, "rating")?
        .map(|r| {
            u8::try_from(r).map_err(|_| {
                RepoError::DataCorruption(format!("meme {id}: rating {r} is out of range"))
            })
        })
        .transpose()?;

    // Empty text is treated the same as NULL.
    let source = column::<Option<String>>(row, "source")?
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<MemeSource>())
        .transpose()
        .map_err(|e| RepoError::DataCorruption(format!("meme {id}: {e}")))?;

    Ok(Meme {
        id,
        description: column(row, "description")?,
        image: MemeImage {
            url,
            width: positive_u32(id, "image_width", column(row, "image_width")?)?,
            height: positive_u32(id, "image_height", column(row, "image_height")?)?,
        },
        rating,
        source,
    })
}
