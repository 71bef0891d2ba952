use serde::Deserialize;
use std::{
    env, fs, io,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";

/// Server configuration. Read from `settings.json` (or `SETTINGS_PATH`),
/// then overridden by `PORT`, `DATABASE_PATH`, `FRONTEND_URL` and
/// `STATIC_DIR` from the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub database_path: String,
    pub static_dir: String,
    /// Allowed CORS origin; any origin when unset.
    pub frontend_url: Option<String>,
    /// Fallback tracing filter when `RUST_LOG` is not set.
    pub log_filter: String,
    /// File the settings came from; `None` when defaults were used.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tcp_socket_binding: "0.0.0.0".into(),
            tcp_socket_port: 5000,
            database_path: "tasks.redb".into(),
            static_dir: "../frontend/dist".into(),
            frontend_url: None,
            log_filter: "info".into(),
            loaded_from: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Settings {
    pub fn load() -> Result<Settings, SettingsError> {
        let path = env::var("SETTINGS_PATH").unwrap_or_else(|_| SETTINGS_FILENAME.to_string());
        Self::load_from(Path::new(&path))?.with_env_overrides(|name| env::var(name).ok())
    }

    /// Parse a settings file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Settings, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut settings: Settings =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.loaded_from = Some(path.to_path_buf());
        Ok(settings)
    }

    fn with_env_overrides(
        mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Settings, SettingsError> {
        if let Some(port) = var("PORT") {
            self.tcp_socket_port = port
                .trim()
                .parse()
                .map_err(|_| SettingsError::Invalid { name: "PORT", value: port })?;
        }
        if let Some(path) = var("DATABASE_PATH") {
            self.database_path = path;
        }
        if let Some(url) = var("FRONTEND_URL") {
            self.frontend_url = Some(url);
        }
        if let Some(dir) = var("STATIC_DIR") {
            self.static_dir = dir;
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip: IpAddr = self
            .tcp_socket_binding
            .parse()
            .map_err(|_| SettingsError::Invalid {
                name: "tcp_socket_binding",
                value: self.tcp_socket_binding.clone(),
            })?;
        Ok(SocketAddr::new(ip, self.tcp_socket_port))
    }
}
