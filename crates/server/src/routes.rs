//! Bookcover route handlers.

use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use bookcover_core::types::MANDATORY_PARAMS_MISSING;
use bookcover_core::{Error, ImageSize};

use crate::error::{ApiError, CONFLICTING_PARAMS};
use crate::lookup::LookupService;
use crate::response;

/// Query parameters of the bookcover routes.
///
/// Only the first occurrence of a parameter counts, and an empty value is the
/// same as a missing one.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CoverParams {
    pub book_title: Option<String>,
    pub author_name: Option<String>,
    pub isbn: Option<String>,
    pub image_size: Option<String>,
}

impl CoverParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (name, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let slot = match name.as_str() {
                "book_title" => &mut params.book_title,
                "author_name" => &mut params.author_name,
                "isbn" => &mut params.isbn,
                "image_size" => &mut params.image_size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    fn size(&self) -> ImageSize {
        ImageSize::from_param(self.image_size.as_deref())
    }
}

type Pairs = Vec<(String, String)>;

fn query_pairs(query: Result<Query<Pairs>, QueryRejection>) -> Result<Pairs, ApiError> {
    query
        .map(|Query(pairs)| pairs)
        .map_err(|rejection| Error::InvalidInput(rejection.body_text()).into())
}

/// `GET /bookcover`, by title and author or by `isbn`.
pub async fn search(
    State(lookup): State<Arc<LookupService>>, query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = CoverParams::from_pairs(query_pairs(query)?);
    let size = params.size();

    if let Some(isbn) = &params.isbn {
        if params.book_title.is_some() || params.author_name.is_some() {
            return Err(Error::InvalidInput(CONFLICTING_PARAMS.into()).into());
        }
        let url = lookup.resolve_by_isbn(isbn, size).await?;
        return Ok(response::success(&url));
    }

    let (Some(title), Some(author)) = (&params.book_title, &params.author_name) else {
        return Err(Error::InvalidInput(MANDATORY_PARAMS_MISSING.into()).into());
    };

    let url = lookup.resolve_by_title_author(title, author, size).await?;
    Ok(response::success(&url))
}

/// `GET /bookcover/{isbn}`.
pub async fn by_isbn(
    State(lookup): State<Arc<LookupService>>, path: Result<Path<String>, PathRejection>,
    query: Result<Query<Pairs>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Path(isbn) = path.map_err(|rejection| ApiError::from(Error::InvalidInput(rejection.body_text())))?;
    let size = CoverParams::from_pairs(query_pairs(query)?).size();
    let url = lookup.resolve_by_isbn(&isbn, size).await?;
    Ok(response::success(&url))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn route_not_supported() -> ApiError {
    ApiError::RouteNotSupported
}
