//! # Error Taxonomy
//!
//! Every failure of an invocation ends up as an [`AppError`], which knows
//! the process exit code it maps to: 2 for usage mistakes (bad arguments,
//! unparseable or unusable request items), 1 for runtime failures.

use crate::items::ParseError;
use crate::render::RenderError;
use crate::request::AssemblyError;
use crate::transport::TransportError;
use thiserror::Error;

/// Exit code for usage errors
pub const EXIT_USAGE: i32 = 2;

/// Exit code for runtime errors
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot parse {item:?}: {source}")]
    Parse { item: String, source: ParseError },
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) | AppError::Parse { .. } => EXIT_USAGE,
            AppError::Assembly(AssemblyError::ReadStdin(_))
            | AppError::Assembly(AssemblyError::EncodeJson(_)) => EXIT_FAILURE,
            AppError::Assembly(_) => EXIT_USAGE,
            AppError::Transport(_) | AppError::Render(_) | AppError::Config(_) => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn usage_errors_should_exit_with_two() {
        assert_eq!(AppError::Usage("bad usage".to_string()).exit_code(), 2);

        let parse = AppError::Parse {
            item: ":x".to_string(),
            source: ParseError::EmptyKey,
        };
        assert_eq!(parse.exit_code(), 2);
        assert_eq!(parse.to_string(), "cannot parse \":x\": empty key");

        let assembly = AppError::from(AssemblyError::JsonModeRequired {
            key: "n".to_string(),
        });
        assert_eq!(assembly.exit_code(), 2);
    }

    #[test]
    fn runtime_errors_should_exit_with_one() {
        let stdin = AppError::from(AssemblyError::ReadStdin(io::Error::other("closed")));
        assert_eq!(stdin.exit_code(), 1);

        let render = AppError::from(RenderError::ReadBody(io::Error::other("reset")));
        assert_eq!(render.exit_code(), 1);
        assert_eq!(render.to_string(), "failed to read response body: reset");

        let config = AppError::from(anyhow::anyhow!("invalid config file"));
        assert_eq!(config.exit_code(), 1);
    }
}
