#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} environment variable not set")]
    MissingConfig(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response from Lunch Money: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Upstream(String),
}
