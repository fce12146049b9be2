use crate::errors::RepoError;
use crate::models::{Meme, MemeFilter, NewMeme};
use async_trait::async_trait;

/// Trait defining operations for storing and retrieving memes.
#[async_trait]
pub trait MemeRepository: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Lists stored memes in ascending ID order, narrowed by `filter`.
    async fn list_all(&self, filter: &MemeFilter) -> Result<Vec<Meme>, RepoError>;

    /// Retrieves a meme by its ID.
    /// Returns Ok(None) if the meme is not found.
    async fn get_by_id(&self, id: i64) -> Result<Option<Meme>, RepoError>;

    /// Stores a new meme under the next free ID and returns it.
    async fn create(&self, meme: &NewMeme) -> Result<Meme, RepoError>;

    /// Replaces every field of the meme with the given ID.
    /// Returns Ok(None) and leaves the store untouched if the ID is absent.
    async fn update(&self, id: i64, meme: &NewMeme) -> Result<Option<Meme>, RepoError>;

    /// Removes the meme with the given ID, reporting whether anything was removed.
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;
}
