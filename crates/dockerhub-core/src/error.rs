//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Collection failed: {0}")]
    Client(#[from] dockerhub_client::ClientError),
}
