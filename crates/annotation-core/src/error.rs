use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Invalid annotation JSON: {0}")]
    Json(#[from] serde_json::Error),
}
