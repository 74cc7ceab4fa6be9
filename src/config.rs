use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_MAX_IMAGE_SIZE_BYTES: usize = 2 * 1024 * 1024;

/// Process configuration, read once at startup and passed by injection
/// into the components that need it.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub images_dir: PathBuf,
    pub max_image_size_bytes: usize,
}

impl Config {
    /// Build from environment variables. `DATABASE_URL` is required,
    /// everything else has a default.
    pub fn from_env() -> Result<Self, String> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("invalid BIND_ADDR: {e}"))?;

        let images_dir = std::env::var("IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/images"));

        let max_image_size_bytes = match std::env::var("MAX_IMAGE_SIZE_BYTES") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| format!("invalid MAX_IMAGE_SIZE_BYTES: {e}"))?,
            Err(_) => DEFAULT_MAX_IMAGE_SIZE_BYTES,
        };

        Ok(Self {
            database_url,
            bind_addr,
            images_dir,
            max_image_size_bytes,
        })
    }
}
