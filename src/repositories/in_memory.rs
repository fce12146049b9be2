use crate::{
    domain::MemeRepository,
    errors::RepoError,
    models::{Meme, MemeFilter, NewMeme},
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{self, info};

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryMemeRepository {
    inner: RwLock<MemeList>,
}

#[derive(Debug, Default)]
struct MemeList {
    memes: Vec<Meme>,
    // Highest ID ever handed out; IDs are never reused after a delete.
    last_id: i64,
}

impl InMemoryMemeRepository {
    pub fn new() -> Self {
        info!("Initializing InMemoryMemeRepository");
        Self::default()
    }
}

#[async_trait]
impl MemeRepository for InMemoryMemeRepository {
    async fn list_all(&self, filter: &MemeFilter) -> Result<Vec<Meme>, RepoError> {
        let list = self.inner.read().await;
        let memes: Vec<Meme> = list
            .memes
            .iter()
            .filter(|meme| filter.matches(meme))
            .cloned()
            .collect();
        tracing::debug!("Memory: Listed {} of {} memes", memes.len(), list.memes.len());
        Ok(memes)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Meme>, RepoError> {
        let list = self.inner.read().await;
        Ok(list.memes.iter().find(|meme| meme.id == id).cloned())
    }

    async fn create(&self, meme: &NewMeme) -> Result<Meme, RepoError> {
        let mut list = self.inner.write().await;
        list.last_id += 1;
        let stored = meme.clone().into_meme(list.last_id);
        list.memes.push(stored.clone());
        tracing::debug!(meme_id = stored.id, "Memory: Stored meme");
        Ok(stored)
    }

    async fn update(&self, id: i64, meme: &NewMeme) -> Result<Option<Meme>, RepoError> {
        let mut list = self.inner.write().await;
        match list.memes.iter_mut().find(|existing| existing.id == id) {
            Some(existing) => {
                *existing = meme.clone().into_meme(id);
                tracing::debug!(meme_id = id, "Memory: Replaced meme");
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut list = self.inner.write().await;
        let before = list.memes.len();
        list.memes.retain(|meme| meme.id != id);
        let removed = list.memes.len() != before;
        tracing::debug!(meme_id = id, removed, "Memory: Delete processed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemeImage, MemeSource};
    use url::Url;

    fn new_meme(description: &str, source: Option<MemeSource>) -> NewMeme {
        NewMeme {
            description: description.to_string(),
            image: MemeImage {
                url: Url::parse("https://example.com/meme.jpg").unwrap(),
                width: Some(640),
                height: None,
            },
            rating: Some(4),
            source,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let repo = InMemoryMemeRepository::new();
        let first = repo.create(&new_meme("first", None)).await.unwrap();
        let second = repo.create(&new_meme("second", None)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(repo.list_all(&MemeFilter::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = InMemoryMemeRepository::new();
        assert_eq!(repo.get_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_id() {
        let repo = InMemoryMemeRepository::new();
        let created = repo.create(&new_meme("before", None)).await.unwrap();

        let updated = repo
            .update(created.id, &new_meme("after", Some(MemeSource::Devs)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.description, "after");
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_missing_leaves_store_unchanged() {
        let repo = InMemoryMemeRepository::new();
        let created = repo.create(&new_meme("only", None)).await.unwrap();

        assert_eq!(repo.update(99, &new_meme("ghost", None)).await.unwrap(), None);
        assert_eq!(
            repo.list_all(&MemeFilter::default()).await.unwrap(),
            vec![created]
        );
    }

    #[tokio::test]
    async fn delete_reports_removal_and_ids_are_not_reused() {
        let repo = InMemoryMemeRepository::new();
        let created = repo.create(&new_meme("doomed", None)).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());

        let next = repo.create(&new_meme("fresh", None)).await.unwrap();
        assert_eq!(next.id, created.id + 1);
    }

    #[tokio::test]
    async fn list_applies_filter() {
        let repo = InMemoryMemeRepository::new();
        repo.create(&new_meme("Distracted boyfriend", Some(MemeSource::Reddit)))
            .await
            .unwrap();
        repo.create(&new_meme("It works on my machine", Some(MemeSource::Devs)))
            .await
            .unwrap();

        let devs = repo
            .list_all(&MemeFilter {
                q: None,
                source: Some(MemeSource::Devs),
            })
            .await
            .unwrap();
        assert_eq!(devs.len(), 1);
        assert_eq!(devs[0].description, "It works on my machine");

        let searched = repo
            .list_all(&MemeFilter {
                q: Some("BOYFRIEND".to_string()),
                source: None,
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
    }
}
