use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

pub struct Config {
    pub store_path: PathBuf,
    pub verbose: bool,
}

impl Config {
    pub fn new(store_path: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            store_path: store_path.unwrap_or_else(default_store_path),
            verbose,
        }
    }

    /// Creates the directory holding the store if it is missing.
    pub fn ensure_store_dir(&self) -> std::io::Result<()> {
        match self.store_path.parent() {
            Some(parent) if parent != Path::new("") => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    /// `RUST_LOG` wins over `--verbose`.
    pub fn log_filter(&self) -> EnvFilter {
        let fallback = if self.verbose {
            "studytrack=debug,info"
        } else {
            "studytrack=warn"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    pub fn init_logging(&self) {
        tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studytrack")
        .join("store.json")
}
