use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KDL parse error: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),

    #[error("'{node}' is missing required key '{key}'")]
    MissingKey { node: String, key: String },

    #[error(
        "no flexinfra manifest found\nLooked for flexinfra.kdl in the current directory, ./.flexinfra/ and the user config directory"
    )]
    ManifestNotFound,
}

pub type Result<T> = std::result::Result<T, CoreError>;
