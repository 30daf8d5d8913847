//! Bearer token resolution for the inference endpoint.

use std::fmt;
use tokio::process::Command;

use crate::config::InferenceConfig;
use crate::error::{AispecError, Result};

/// A resolved bearer token. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.len())
    }
}

/// Run a credential command and return its trimmed stdout.
pub async fn run_credential_command(argv: &[String]) -> Result<Credential> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| AispecError::Credential("credential command is empty".to_string()))?;

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| AispecError::Credential(format!("failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AispecError::Credential(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    let token = String::from_utf8(output.stdout)
        .map_err(|_| AispecError::Credential(format!("{} printed non UTF-8 output", program)))?
        .trim()
        .to_string();

    if token.is_empty() {
        return Err(AispecError::Credential(format!("{} printed an empty token", program)));
    }

    Ok(Credential(token))
}

/// Resolve the credential for this run.
///
/// `credential_command` wins over `api_key_env`; with neither configured the
/// endpoint is called unauthenticated.
pub async fn resolve_credential(config: &InferenceConfig) -> Result<Option<Credential>> {
    if let Some(argv) = &config.credential_command {
        log::debug!("Retrieving credential via {:?}", argv.first());
        return run_credential_command(argv).await.map(Some);
    }

    if let Some(var) = &config.api_key_env {
        let token = std::env::var(var).map_err(|_| {
            AispecError::Credential(format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable.",
                var
            ))
        })?;
        return Ok(Some(Credential(token)));
    }

    Ok(None)
}
