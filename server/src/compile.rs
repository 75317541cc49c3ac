/**
 * @file compile.rs
 * @author Nguyen Le Duy
 * @date 09/04/2025
 * @brief Handling compilation requests and responses.
 */
use api_types::*;
use futures::future::{self, BoxFuture, FutureExt};
use thiserror::Error;
use warp::http::StatusCode;

use crate::board::BoardTable;
use crate::config::ServerConfig;
use crate::remote::RemoteCompiler;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("No code provided")]
    NoCode,
    #[error("No board specified")]
    NoBoard,
    #[error("Compilation service not configured. Set COMPILE_SERVICE_URL to the base URL of the compile service")]
    ServiceNotConfigured,
    #[error("Failed to reach compilation service: {0}")]
    Transport(String),
    #[error("Compilation service error ({status}): {body}")]
    Service { status: u16, body: String },
    #[error("Invalid response from compilation service: {0}")]
    InvalidResponse(String),
}

impl CompileError {
    /// Only request-shape errors and the deployment state get a non-2xx status.
    /// Anything that went wrong while compiling is a normal outcome.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CompileError::NoCode | CompileError::NoBoard => StatusCode::BAD_REQUEST,
            CompileError::ServiceNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            CompileError::Transport(_)
            | CompileError::Service { .. }
            | CompileError::InvalidResponse(_) => StatusCode::OK,
        }
    }
}

impl From<CompileError> for CompileResponse {
    fn from(err: CompileError) -> Self {
        CompileResponse::failure(err.to_string())
    }
}

/// A validated request with its board already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sketch {
    pub code: String,
    pub fqbn: String,
    pub libraries: Vec<String>,
    pub verbose: bool,
}

/// Something that can turn a sketch into a [`CompileResponse`].
pub trait Compiler: Send + Sync {
    fn name(&self) -> &'static str;

    fn compile(&self, sketch: Sketch) -> BoxFuture<'_, Result<CompileResponse, CompileError>>;

    /// Whether the backend is currently able to take requests.
    fn is_online(&self) -> BoxFuture<'_, bool>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Backend of a deployment without a compile service.
pub struct Unconfigured;

impl Compiler for Unconfigured {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    fn compile(&self, _sketch: Sketch) -> BoxFuture<'_, Result<CompileResponse, CompileError>> {
        future::ready(Err(CompileError::ServiceNotConfigured)).boxed()
    }

    fn is_online(&self) -> BoxFuture<'_, bool> {
        future::ready(false).boxed()
    }

    fn is_configured(&self) -> bool {
        false
    }
}

pub struct Dispatcher {
    boards: BoardTable,
    backend: Box<dyn Compiler>,
}

impl Dispatcher {
    pub fn new(boards: BoardTable, backend: Box<dyn Compiler>) -> Self {
        Self { boards, backend }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let backend: Box<dyn Compiler> = match config.compile_service_url.as_deref() {
            Some(url) => Box::new(RemoteCompiler::new(url)),
            None => Box::new(Unconfigured),
        };

        Self::new(BoardTable::new(config.board_table()), backend)
    }

    pub fn boards(&self) -> &BoardTable {
        &self.boards
    }

    pub fn backend(&self) -> &dyn Compiler {
        self.backend.as_ref()
    }

    /// Validate the request and resolve its board.
    pub fn prepare(&self, req: CompileRequest) -> Result<Sketch, CompileError> {
        if req.code.is_empty() {
            return Err(CompileError::NoCode);
        }

        if req.board.is_empty() {
            return Err(CompileError::NoBoard);
        }

        let fqbn = self.boards.resolve(&req.board).to_owned();

        Ok(Sketch {
            code: req.code,
            fqbn,
            libraries: req.libraries,
            verbose: req.verbose,
        })
    }

    /// Compile with the configured backend.
    pub async fn compile(&self, req: CompileRequest) -> Result<CompileResponse, CompileError> {
        self.compile_with(self.backend.as_ref(), req).await
    }

    /// Compile with an explicit backend, single attempt.
    pub async fn compile_with(
        &self,
        compiler: &dyn Compiler,
        req: CompileRequest,
    ) -> Result<CompileResponse, CompileError> {
        let board = req.board.clone();
        let sketch = match self.prepare(req) {
            Ok(sketch) => sketch,
            Err(e) => {
                log::debug!("Rejected compile request: {}", e);
                return Err(e);
            }
        };

        let fqbn = sketch.fqbn.clone();
        let result = compiler.compile(sketch).await;

        match &result {
            Ok(res) => log::info!(
                "Compiled for {} ({}) with {}: success={}",
                board,
                fqbn,
                compiler.name(),
                res.success
            ),
            Err(e) => log::warn!(
                "Compile for {} ({}) with {} failed: {}",
                board,
                fqbn,
                compiler.name(),
                e
            ),
        }

        result
    }

    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            service_configured: self.backend.is_configured(),
            service_online: self.backend.is_online().await,
            supported_boards: self.boards.display_names(),
        }
    }
}
