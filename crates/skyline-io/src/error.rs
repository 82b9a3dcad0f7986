use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read layout file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: XML syntax error: {source}")]
    Xml {
        file: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("unsupported layout file {path} (expected a .gvl or .sld extension)")]
    UnknownFormat { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
