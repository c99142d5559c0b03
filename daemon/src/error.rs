use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid listen address {0}")]
    ListenAddr(String),
}

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Lmdb(#[from] acp_store_lmdb::LmdbError),

    #[error("store error: {0}")]
    Store(#[from] acp_store::StoreError),

    #[error("invalid seed catalogue: {0}")]
    Seed(String),

    #[error("database integrity check failed with {0} error(s)")]
    Integrity(usize),
}
