//! Client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token request failed: {0}")]
    Auth(String),

    #[error("Registry returned error status {status}")]
    Registry { status: u16 },
}
