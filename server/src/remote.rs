/**
 * @file remote.rs
 * @author Nguyen Le Duy
 * @date 14/04/2025
 * @brief Client of the remote compile service running the real toolchain.
 */
use api_types::*;
use futures::future::{BoxFuture, FutureExt};
use std::time::Duration;

use crate::compile::{CompileError, Compiler, Sketch};

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on reaching the service. How long a compile takes is up to the service.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RemoteCompiler {
    base_url: String,
    agent: ureq::Agent,
    health_agent: ureq::Agent,
}

impl RemoteCompiler {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout_connect(CONNECT_TIMEOUT)
                .build(),
            health_agent: health_agent(HEALTH_TIMEOUT),
        }
    }

    #[cfg(test)]
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_agent = health_agent(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, sketch: Sketch) -> Result<CompileResponse, CompileError> {
        let body = PeerCompileRequest {
            sketch: sketch.code,
            fqbn: sketch.fqbn,
            libraries: sketch.libraries,
            verbose: sketch.verbose,
        };

        let agent = self.agent.clone();
        let url = self.url("compile");

        // A caller that goes away only discards the result
        tokio::task::spawn_blocking(move || post_sketch(&agent, &url, &body))
            .await
            .map_err(|e| CompileError::Transport(e.to_string()))?
    }

    async fn probe(&self) -> bool {
        let agent = self.health_agent.clone();
        let url = self.url("health");

        match tokio::task::spawn_blocking(move || agent.get(&url).call()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                log::debug!("Compile service health check failed: {}", e);
                false
            }
            Err(e) => {
                log::debug!("Compile service health check aborted: {}", e);
                false
            }
        }
    }
}

/// The whole request, including reading the reply, is bounded by `timeout`.
fn health_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

fn post_sketch(
    agent: &ureq::Agent,
    url: &str,
    body: &PeerCompileRequest,
) -> Result<CompileResponse, CompileError> {
    match agent.post(url).send_json(body) {
        Ok(response) => response
            .into_json::<CompileResponse>()
            .map_err(|e| CompileError::InvalidResponse(e.to_string())),
        Err(ureq::Error::Status(status, response)) => {
            let status_text = response.status_text().to_string();
            let body = response
                .into_string()
                .ok()
                .filter(|text| !text.is_empty())
                .unwrap_or(status_text);

            Err(CompileError::Service { status, body })
        }
        Err(ureq::Error::Transport(e)) => Err(CompileError::Transport(e.to_string())),
    }
}

impl Compiler for RemoteCompiler {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn compile(&self, sketch: Sketch) -> BoxFuture<'_, Result<CompileResponse, CompileError>> {
        self.send(sketch).boxed()
    }

    fn is_online(&self) -> BoxFuture<'_, bool> {
        self.probe().boxed()
    }
}
