//! Error and Result module

use std::path::PathBuf;

use derive_more::{Display, Error, From};
use zzt_router::InvalidRoute;

/// Errors that abort startup.
///
/// None of these can be recovered from while serving: a process whose route table failed to build
/// should not start accepting requests.
#[derive(Debug, Display, Error, From)]
#[non_exhaustive]
pub enum StartupError {
    /// A route declaration is malformed.
    #[display(fmt = "{}", _0)]
    InvalidRoute(InvalidRoute),

    /// A handler locator did not resolve to a handler.
    #[display(fmt = "handler {:?} not found in module {:?}", locator, module)]
    #[from(ignore)]
    HandlerNotFound { module: String, locator: String },

    /// Routes were registered for a module that is not present in the modules folder.
    #[display(fmt = "module {:?} is not present in the modules folder", _0)]
    #[from(ignore)]
    UnknownModule(#[error(not(source))] String),

    /// A module folder does not hold its entry file.
    #[display(fmt = "module {:?} has no entry file at {:?}", module, path)]
    #[from(ignore)]
    MissingModuleFile { module: String, path: PathBuf },

    /// Configuration could not be loaded.
    #[display(fmt = "{}", _0)]
    Config(ConfigError),
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Display, Error, From)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required key is missing.
    #[display(fmt = "missing config key: {}", _0)]
    #[from(ignore)]
    Missing(#[error(not(source))] &'static str),

    /// Config file or modules folder could not be read.
    #[display(fmt = "config I/O error: {}", _0)]
    Io(std::io::Error),

    /// Config file is not valid JSON.
    #[display(fmt = "config parse error: {}", _0)]
    Json(serde_json::Error),
}

/// A convenience [`Result`](std::result::Result) for startup operations.
pub type Result<T, E = StartupError> = std::result::Result<T, E>;
