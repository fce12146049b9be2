pub mod config;
pub mod domain;
pub mod errors;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod startup;

use std::sync::Arc;

use crate::domain::MemeRepository;

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub meme_repo: Arc<dyn MemeRepository>,
}
