use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("spawn position ({0}, {1}) is outside the battlefield")]
    SpawnOutOfBounds(f32, f32),

    #[error("no free tile near ({0}, {1}) to deploy on")]
    DeploymentBlocked(f32, f32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
