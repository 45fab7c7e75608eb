use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to read partition: {0}")]
    Io(#[from] std::io::Error),
}
