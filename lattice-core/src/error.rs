//! Lattice error abstractions.

use thiserror::Error;
use tonic::{Code, Status};

/// Application error variants.
///
/// These are the error kinds surfaced to operators; anything that does not
/// fit one of the named kinds travels as a plain `anyhow::Error`.
#[derive(Debug, Error)]
pub enum AppError {
    /// The operator supplied invalid or inconsistent input.
    #[error("{0}")]
    Config(String),
    /// Host validation detected a fatal environment condition.
    #[error("{0}")]
    Env(String),
    /// A wrapped utility exited non-zero.
    #[error("executing {utility}: {output}")]
    Subprocess { utility: String, output: String },
    /// SQL against the coordinator failed.
    #[error("{0}")]
    Catalog(String),
    /// On-disk state indicates an incomplete prior run.
    #[error("{0}")]
    State(String),
    /// The server has hit an internal error, but will remain online.
    #[error("internal server error")]
    Ise(anyhow::Error),
}

/// An extension trait for mapping application errors onto the RPC plane.
pub trait AppErrorExt {
    /// Get the gRPC status code and message for this error.
    fn into_status(self) -> Status;

    /// Translate the given error as an app error and map into a gRPC status object.
    fn grpc(err: anyhow::Error) -> Status;
}

impl AppErrorExt for AppError {
    fn into_status(self) -> Status {
        match self {
            AppError::Config(_) | AppError::Env(_) => Status::invalid_argument(self.to_string()),
            AppError::Subprocess { .. } | AppError::Catalog(_) | AppError::State(_) => Status::internal(self.to_string()),
            AppError::Ise(_) => Status::internal(self.to_string()),
        }
    }

    fn grpc(err: anyhow::Error) -> Status {
        err.downcast::<Status>()
            .or_else(|err| err.downcast::<Self>().map(Self::into_status))
            .unwrap_or_else(|err| Status::internal(format!("{:#}", err)))
    }
}

/// A result type used with the gRPC system.
pub type RpcResult<T> = ::std::result::Result<T, Status>;

/// Strip the transport noise off a gRPC status so operators see the message only.
pub fn format_grpc_error(status: Status) -> anyhow::Error {
    match status.code() {
        Code::Unavailable => anyhow::anyhow!("could not connect to the service: {}", status.message()),
        Code::DeadlineExceeded => anyhow::anyhow!("request timed out: {}", status.message()),
        _ => anyhow::anyhow!("{}", status.message()),
    }
}
