use std::path::PathBuf;

/// Errors raised by the harness itself.
///
/// Anything that goes wrong inside the physics engine is the engine's
/// business; these cover configuration, file output and pool setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown motion quality '{0}' (expected 'discrete' or 'ccd')")]
    UnknownMotionQuality(String),
    #[error("Failed to build a {threads}-thread pool: {source}")]
    ThreadPool {
        threads: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
    #[error("Convex hull of shape '{0}' is degenerate")]
    DegenerateHull(&'static str),
}

impl BenchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
