use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use url::Url;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Where a meme was found. Stored and serialized as its exact variant name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(into = "&'static str", try_from = "String")]
pub enum MemeSource {
    Reddit,
    Twitter,
    Devs,
    Unknown,
}

impl MemeSource {
    pub const ALL: [MemeSource; 4] = [
        MemeSource::Reddit,
        MemeSource::Twitter,
        MemeSource::Devs,
        MemeSource::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemeSource::Reddit => "Reddit",
            MemeSource::Twitter => "Twitter",
            MemeSource::Devs => "Devs",
            MemeSource::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for MemeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown meme source '{0}' (expected one of Reddit, Twitter, Devs, Unknown)")]
pub struct UnknownSource(pub String);

impl FromStr for MemeSource {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemeSource::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

impl From<MemeSource> for &'static str {
    fn from(source: MemeSource) -> Self {
        source.as_str()
    }
}

impl TryFrom<String> for MemeSource {
    type Error = UnknownSource;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MemeImage {
    pub url: Url,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A stored meme. `id` is always assigned by the repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Meme {
    pub id: i64,
    pub description: String,
    pub image: MemeImage,
    pub rating: Option<u8>,
    pub source: Option<MemeSource>,
}

/// Request payload for creating or replacing a meme.
///
/// Any `id` sent by the client is ignored during deserialization.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewMeme {
    pub description: String,
    pub image: MemeImage,
    pub rating: Option<u8>,
    pub source: Option<MemeSource>,
}

impl NewMeme {
    pub fn into_meme(self, id: i64) -> Meme {
        Meme {
            id,
            description: self.description,
            image: self.image,
            rating: self.rating,
            source: self.source,
        }
    }
}

/// Optional narrowing applied to `GET /api/memes`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MemeFilter {
    /// Case-insensitive substring of the description.
    pub q: Option<String>,
    pub source: Option<MemeSource>,
}

impl MemeFilter {
    pub fn matches(&self, meme: &Meme) -> bool {
        if let Some(source) = self.source {
            if meme.source != Some(source) {
                return false;
            }
        }
        match &self.q {
            Some(q) => meme
                .description
                .to_ascii_lowercase()
                .contains(&q.to_ascii_lowercase()),
            None => true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("image url must use http or https, got '{0}'")]
    UnsupportedUrlScheme(String),
    #[error("image url must include a host")]
    MissingUrlHost,
    #[error("image {0} must be a positive integer")]
    NonPositiveDimension(&'static str),
    #[error("rating must be between {MIN_RATING} and {MAX_RATING}, got {0}")]
    RatingOutOfRange(u8),
}

/// Checks run on a request body after it has been deserialized.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for MemeImage {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.url.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedUrlScheme(other.to_string())),
        }
        if self.url.host_str().is_none_or(str::is_empty) {
            return Err(ValidationError::MissingUrlHost);
        }
        if self.width == Some(0) {
            return Err(ValidationError::NonPositiveDimension("width"));
        }
        if self.height == Some(0) {
            return Err(ValidationError::NonPositiveDimension("height"));
        }
        Ok(())
    }
}

impl Validate for NewMeme {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        self.image.validate()?;
        match self.rating {
            Some(rating) if !(MIN_RATING..=MAX_RATING).contains(&rating) => {
                Err(ValidationError::RatingOutOfRange(rating))
            }
            _ => Ok(()),
        }
    }
}
