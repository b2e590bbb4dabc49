use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    CLI(String),
    NotFound(String),
    IO(std::io::Error),
    Reqwest(reqwest::Error),
    SerdeJson(serde_json::Error),
    Url(url::ParseError),
    /// Routing service answered with a non-success status
    Http { status: u16, message: String },
    Geometry(String),
    StaticMap(staticmap::Error),
    Pdf(String),
    Blocking(BlockingError),
    InvalidInput(String),
    Conf(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CLI(err) => write!(f, "{}", err),
            Error::NotFound(err) => write!(f, "{}", err),
            Error::IO(err) => err.fmt(f),
            Error::Reqwest(err) => err.fmt(f),
            Error::SerdeJson(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::Http { status, message } => {
                write!(f, "HTTP error occurred: {status}")?;
                if !message.is_empty() {
                    write!(f, " {message}")?;
                }
                Ok(())
            }
            Error::Geometry(err) => write!(f, "Invalid isochrone geometry: {}", err),
            Error::StaticMap(err) => write!(f, "Failed to render map: {}", err),
            Error::Pdf(err) => write!(f, "Failed to export PDF: {}", err),
            Error::Blocking(err) => err.fmt(f),
            Error::InvalidInput(err) => write!(f, "{}", err),
            Error::Conf(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Reqwest(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerdeJson(error)
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::Url(error)
    }
}

impl From<staticmap::Error> for Error {
    fn from(error: staticmap::Error) -> Self {
        Error::StaticMap(error)
    }
}

impl From<BlockingError> for Error {
    fn from(error: BlockingError) -> Self {
        Error::Blocking(error)
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub http_code: u16,
    pub message: String,
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError {
            http_code: self.status_code().as_u16(),
            message: self.to_string(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Http { .. } | Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
