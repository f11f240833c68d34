//! Error types for the order management service.
//!
//! [`Error`] captures every failure the core can report. It converts into
//! `tonic::Status` so handlers can propagate with `?` and clients receive a
//! status code they can branch on.
//!
//! ## Error Cases
//! - `InvalidArgument`: Client input failed validation. Carries the offending
//!   field and a description, attached to the status as a
//!   `google.rpc.BadRequest` field violation.
//! - `NotFound`: No order is stored under the requested identifier.
//! - `Transport`: Reading the inbound stream failed. Passed through verbatim.
//! - `ChannelError`: The outbound channel to the client closed early.
//! - `EngineTerminated`: A consolidator was used after end-of-input.
//! - `ServiceShutdown`: The request arrived while the service was draining.

use tonic::{Code, Status};
use tonic_types::{ErrorDetails, StatusExt};

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the order management service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// A request field was rejected during validation.
    #[error("Invalid argument {field}: {description}")]
    InvalidArgument { field: String, description: String },

    /// The requested order identifier is not in the store.
    #[error("Order does not exist. : {id}")]
    NotFound { id: String },

    /// The inbound stream failed before end-of-stream.
    #[error("Stream read failed: {}", .0.message())]
    Transport(#[from] Status),

    /// Internal channel send/receive failure (e.g., client went away).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The consolidator already reached its terminal state.
    #[error("Shipment consolidation already terminated")]
    EngineTerminated,

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidArgument { field, description } => Status::with_error_details(
                Code::InvalidArgument,
                "Invalid information received",
                ErrorDetails::with_bad_request_violation(field, description),
            ),
            Error::NotFound { id } => Status::not_found(format!("Order does not exist. : {id}")),
            Error::Transport(status) => status,
            Error::ChannelError { context } => {
                Status::unavailable(format!("Channel error: {context}"))
            }
            Error::EngineTerminated => {
                Status::internal("Shipment consolidation already terminated")
            }
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_carries_field_violation() {
        let status: Status = Error::InvalidArgument {
            field: "ID".to_string(),
            description: "Order ID received is not valid -1 : broken".to_string(),
        }
        .into();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Invalid information received");

        let details = status.get_error_details();
        let bad_request = details.bad_request().expect("missing BadRequest details");
        assert_eq!(bad_request.field_violations.len(), 1);
        assert_eq!(bad_request.field_violations[0].field, "ID");
        assert_eq!(
            bad_request.field_violations[0].description,
            "Order ID received is not valid -1 : broken"
        );
    }

    #[test]
    fn not_found_names_the_missing_id() {
        let status: Status = Error::NotFound {
            id: "404".to_string(),
        }
        .into();
        assert_eq!(status.code(), Code::NotFound);
        assert!(status.message().contains("404"));
    }

    #[test]
    fn transport_status_passes_through_unchanged() {
        let original = Status::aborted("peer reset");
        let status: Status = Error::from(original).into();
        assert_eq!(status.code(), Code::Aborted);
        assert_eq!(status.message(), "peer reset");
    }
}
