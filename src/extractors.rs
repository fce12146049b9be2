//! Extractors that reject malformed input before any handler logic runs.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{errors::AppError, models::Validate};

/// A meme ID taken from the `{id}` path segment. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemeId(pub i64);

impl<S> FromRequestParts<S> for MemeId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidId(rejection.body_text()))?;
        parse_meme_id(&raw).map(MemeId)
    }
}

pub fn parse_meme_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        Ok(id) => Err(AppError::InvalidId(format!("{} must be greater than or equal to 1", id))),
        Err(_) => Err(AppError::InvalidId(format!("'{}' is not a valid integer", raw))),
    }
}

/// JSON body that has been deserialized and passed `Validate`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_ids() {
        assert_eq!(parse_meme_id("1").unwrap(), 1);
        assert_eq!(parse_meme_id("99999").unwrap(), 99999);
    }

    #[test]
    fn rejects_ids_outside_the_domain() {
        for raw in ["0", "-1", "abc", "1.5", "", "99999999999999999999"] {
            assert!(
                matches!(parse_meme_id(raw), Err(AppError::InvalidId(_))),
                "expected '{raw}' to be rejected"
            );
        }
    }
}
