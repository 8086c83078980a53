use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("unknown query parameter: {0}")]
    UnknownParameter(String),

    #[error("invalid category filter: {0}")]
    InvalidCategory(String),

    #[error("invalid {0} filter: must be a positive integer")]
    InvalidNumber(&'static str),
}
