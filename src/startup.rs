use crate::{
    config::{Config, StoreKind},
    domain::MemeRepository,
    errors::AppError,
    models::{MemeFilter, MemeImage, MemeSource, NewMeme},
    repositories::{InMemoryMemeRepository, SqliteMemeRepository},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing;
use url::Url;

/// Opens a connection pool for the given sqlx SQLite URL, creating the file if missing.
///
/// An in-memory database lives only as long as its connection, so those URLs get a
/// single connection that is never closed for idleness or age.
pub async fn connect_database(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::InitError(format!("Invalid database URL '{}': {}", database_url, e)))?
        .create_if_missing(true);

    let pool_options = if is_memory_url(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        SqlitePoolOptions::new()
    };

    tracing::info!(%database_url, "Startup: Connecting to SQLite database");
    pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::InitError(format!("Failed to open database '{}': {}", database_url, e)))
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Creates the memes table if it doesn't exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS memes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            image_url TEXT NOT NULL,
            image_width INTEGER,
            image_height INTEGER,
            rating INTEGER,
            source TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::InitError(format!("Failed to create memes table: {}", e)))?;

    tracing::info!("Startup: Table 'memes' created or already exists.");
    Ok(())
}

fn sample_memes() -> Result<Vec<NewMeme>, AppError> {
    let samples = [
        ("Drake prefers memes over documentation", "https://i.imgflip.com/30b1gx.jpg", Some(5), MemeSource::Reddit),
        ("Distracted boyfriend spots a new framework", "https://i.imgflip.com/1ur9b0.jpg", Some(4), MemeSource::Twitter),
        ("It works on my machine", "https://i.imgflip.com/1bij.jpg", Some(5), MemeSource::Devs),
        ("This is fine", "https://i.imgflip.com/wxica.jpg", None, MemeSource::Unknown),
    ];

    samples
        .into_iter()
        .map(|(description, url, rating, source)| {
            let url = Url::parse(url)
                .map_err(|e| AppError::InitError(format!("Invalid sample meme URL '{}': {}", url, e)))?;
            Ok(NewMeme {
                description: description.to_string(),
                image: MemeImage { url, width: None, height: None },
                rating,
                source: Some(source),
            })
        })
        .collect()
}

/// Inserts the built-in sample memes when the store is empty. Returns how many were added.
pub async fn seed_sample_memes(repo: &dyn MemeRepository) -> Result<usize, AppError> {
    if !repo.list_all(&MemeFilter::default()).await?.is_empty() {
        tracing::info!("Startup: Store already has memes, skipping sample data.");
        return Ok(0);
    }

    let samples = sample_memes()?;
    for meme in &samples {
        repo.create(meme).await?;
    }
    tracing::info!("Startup: Seeded {} sample memes.", samples.len());
    Ok(samples.len())
}

/// Builds the configured meme store, ready to serve requests.
pub async fn init_resources(config: &Config) -> Result<Arc<dyn MemeRepository>, AppError> {
    tracing::info!(store = ?config.store, "Startup: Initializing meme store...");

    let repo: Arc<dyn MemeRepository> = match config.store {
        StoreKind::Memory => Arc::new(InMemoryMemeRepository::new()),
        StoreKind::Sqlite => {
            let pool = connect_database(&config.database_url).await?;
            init_schema(&pool).await?;
            Arc::new(SqliteMemeRepository::new(pool))
        }
    };

    if config.seed_sample_memes {
        seed_sample_memes(repo.as_ref()).await?;
    }

    tracing::info!("Startup: Meme store initialization complete.");
    Ok(repo)
}
