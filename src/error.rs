use thiserror::Error;

use crate::config::ConfigError;
use crate::proxy::vhost::VhostError;

/// Errors that stop a server from starting.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Vhost(#[from] VhostError),
}

pub type Result<T> = std::result::Result<T, Error>;
