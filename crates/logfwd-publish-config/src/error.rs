use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid image name: {0}")]
    InvalidImage(String),

    #[error("Container engine is not set")]
    EngineNotSet,

    #[error("Artifact name must be a plain file name: {0}")]
    InvalidArtifactName(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
