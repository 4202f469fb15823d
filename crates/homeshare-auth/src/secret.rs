//! Token signing secret provisioning.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use tracing::info;

use homeshare_core::config::auth::AuthConfig;
use homeshare_core::error::{AppError, ErrorKind};

/// Returns the configured secret, or the one persisted in `secret_file`,
/// generating and persisting a new random one on first start.
pub async fn load_or_create_secret(config: &AuthConfig) -> Result<Vec<u8>, AppError> {
    if !config.jwt_secret.is_empty() {
        return Ok(config.jwt_secret.as_bytes().to_vec());
    }
    load_or_create_secret_file(&config.secret_file).await
}

async fn load_or_create_secret_file(path: &Path) -> Result<Vec<u8>, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let secret = contents.trim();
            if secret.is_empty() {
                return Err(AppError::configuration(format!(
                    "Secret file {} is empty",
                    path.display()
                )));
            }
            Ok(secret.as_bytes().to_vec())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let mut raw = [0u8; 32];
            rand::rng().fill_bytes(&mut raw);
            let secret = STANDARD.encode(raw);

            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &secret).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to write secret file {}", path.display()),
                    e,
                )
            })?;

            info!(path = %path.display(), "Generated new token signing secret");
            Ok(secret.into_bytes())
        }
        Err(e) => Err(AppError::with_source(
            ErrorKind::Configuration,
            format!("Failed to read secret file {}", path.display()),
            e,
        )),
    }
}
