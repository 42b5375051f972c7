use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::context;
use thiserror::Error;
use tracing::error;

use crate::web::templates;

/// Errors surfaced by the web layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("database error: {0:#}")]
    Database(anyhow::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("❌ {}", self);
        }
        let (template, title) = match status {
            StatusCode::NOT_FOUND => ("404.html", "Página no encontrada"),
            _ => ("500.html", "Error del servidor"),
        };
        let body = templates::render(template, context! { title => title })
            .unwrap_or_else(|_| title.to_string());
        (status, Html(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
