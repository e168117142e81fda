//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ProtocolError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProtocolError(ProtocolError::Connect { addr, .. }) => format!(
            "{}\nIs `treelink host` running on {} and reachable through the firewall?",
            e, addr
        ),
        _ => e.to_string(),
    }
}
