use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur acquiring or operating a sink
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Sink does not support repositioning")]
    NotSeekable,

    #[error("Injected failure: {0}")]
    Injected(&'static str),
}

impl Error {
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn not_a_directory<P: AsRef<Path>>(path: P) -> Self {
        Error::NotADirectory(path.as_ref().to_path_buf())
    }

    pub fn injected(what: &'static str) -> Self {
        Error::Injected(what)
    }
}
