use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid receive configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
