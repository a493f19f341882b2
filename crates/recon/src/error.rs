use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("input table has no rows")]
    EmptyInput,
}
