use clap::Parser;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const SERVER_ADDRESS_ENV: &str = "SERVER_ADDRESS";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const FILE_STORAGE_PATH_ENV: &str = "FILE_STORAGE_PATH";
pub const DATABASE_DSN_ENV: &str = "DATABASE_DSN";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    InMemoryWithSnapshot,
    Postgres,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::InMemory => write!(f, "in-memory"),
            StorageBackend::InMemoryWithSnapshot => write!(f, "in-memory+snapshot"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pinhole-gateway")]
pub struct CLI {
    /// Address the HTTP server listens on.
    #[arg(short = 'a', long, env = SERVER_ADDRESS_ENV, default_value = DEFAULT_SERVER_ADDRESS)]
    pub server_address: String,

    /// Prefix of every short URL handed out.
    #[arg(short = 'b', long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// JSON snapshot file for the in-memory store.
    #[arg(short = 'f', long, env = FILE_STORAGE_PATH_ENV)]
    pub file_storage_path: Option<PathBuf>,

    /// PostgreSQL DSN. Takes precedence over the file storage path.
    #[arg(short = 'd', long, env = DATABASE_DSN_ENV)]
    pub database_dsn: Option<String>,
}

/// Returns the `.env` loading error worth reporting. A missing file is not one.
pub fn dotenv_failure<T>(result: &Result<T, dotenvy::Error>) -> Option<&dotenvy::Error> {
    match result {
        Ok(_) | Err(dotenvy::Error::Io(_)) => None,
        Err(err) => Some(err),
    }
}

impl CLI {
    pub fn database_dsn(&self) -> Option<&str> {
        self.database_dsn.as_deref().filter(|dsn| !dsn.is_empty())
    }

    pub fn file_storage_path(&self) -> Option<PathBuf> {
        self.file_storage_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub fn storage_backend(&self) -> StorageBackend {
        if self.database_dsn().is_some() {
            StorageBackend::Postgres
        } else if self.file_storage_path().is_some() {
            StorageBackend::InMemoryWithSnapshot
        } else {
            StorageBackend::InMemory
        }
    }
}
