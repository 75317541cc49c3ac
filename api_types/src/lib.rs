//! sketch-server
//! Author: Nguyen Le Duy
//! Date: 06/04/2025
//! Description: This module defines the data structures used for
//! interacting between the client, the compile server and the remote
//! compile service.

use serde::{Deserialize, Serialize};

/// A supported board: the label shown to the user and the fully-qualified
/// board name understood by the toolchain (`vendor:architecture:variant`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardIdentity {
    pub display_name: String,
    pub fqbn: String,
}

impl BoardIdentity {
    pub fn new(display_name: impl Into<String>, fqbn: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            fqbn: fqbn.into(),
        }
    }
}

/// Represents a request to compile a single sketch.
/// Missing fields deserialize to their empty value so that the server can
/// report exactly which one was absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Raw sketch source.
    #[serde(default)]
    pub code: String,
    /// Board display name or a raw FQBN.
    #[serde(default)]
    pub board: String,
    /// Libraries to install before compiling, in order.
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Toggle toolchain verbosity.
    #[serde(default)]
    pub verbose: bool,
}

/// The normalized result of one compile attempt.
///
/// `success == true` always carries both `binary` and `size`.
/// `success == false` carries at least one entry in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResponse {
    pub success: bool,
    /// Artifact bytes in base64 format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Artifact size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Toolchain and log lines for display.
    #[serde(default)]
    pub output: Vec<String>,
}

impl CompileResponse {
    /// A failed compilation with a single error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![message.into()],
            ..Default::default()
        }
    }
}

/// Reply of the status probe. Used purely for UI status display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub service_configured: bool,
    pub service_online: bool,
    pub supported_boards: Vec<String>,
}

/// Body sent to the remote compile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerCompileRequest {
    pub sketch: String,
    pub fqbn: String,
    pub libraries: Vec<String>,
    pub verbose: bool,
}
