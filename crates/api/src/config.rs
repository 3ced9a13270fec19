use std::path::PathBuf;

use jewelcase_core::upload::DEFAULT_MAX_UPLOAD_BYTES;

/// Which catalog store backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Whole catalog in one JSON file.
    File { path: PathBuf },
    /// One row per item in PostgreSQL.
    Postgres { database_url: String },
    /// In-process only; contents are lost on restart.
    Memory,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A single `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Catalog persistence backend.
    pub store: StoreConfig,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: PathBuf,
    /// Directory holding the storefront and admin assets.
    pub static_dir: PathBuf,
    /// Largest accepted image upload in bytes.
    pub max_upload_bytes: usize,
    /// Admin panel account.
    pub admin_username: String,
    pub admin_password: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default              |
    /// |------------------------|----------------------|
    /// | `HOST`                 | `0.0.0.0`            |
    /// | `PORT`                 | `3000`               |
    /// | `CORS_ORIGINS`         | `*`                  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                 |
    /// | `STORE_BACKEND`        | `file`               |
    /// | `DATA_FILE`            | `data/jewelry.json`  |
    /// | `DATABASE_URL`         | (postgres only)      |
    /// | `UPLOAD_DIR`           | `images`             |
    /// | `STATIC_DIR`           | `public`             |
    /// | `MAX_UPLOAD_BYTES`     | `5242880`            |
    /// | `ADMIN_USERNAME`       | `admin`              |
    /// | `ADMIN_PASSWORD`       | `admin123`           |
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "file".into());
        let store = match backend.trim().to_lowercase().as_str() {
            "file" => StoreConfig::File {
                path: std::env::var("DATA_FILE")
                    .unwrap_or_else(|_| "data/jewelry.json".into())
                    .into(),
            },
            "postgres" => StoreConfig::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .expect("DATABASE_URL must be set when STORE_BACKEND=postgres"),
            },
            "memory" => StoreConfig::Memory,
            other => panic!("Unknown STORE_BACKEND '{other}'. Must be one of: file, postgres, memory"),
        };

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "images".into())
            .into();

        let static_dir = std::env::var("STATIC_DIR")
            .unwrap_or_else(|_| "public".into())
            .into();

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let admin_username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store,
            upload_dir,
            static_dir,
            max_upload_bytes,
            admin_username,
            admin_password,
        }
    }

    /// Whether CORS is open to every origin.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
