use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set to reach the grade store")]
    Missing(&'static str),

    #[error("Invalid store URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    #[error("Failed to connect to the grade store: {0}")]
    Connect(#[source] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
