use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod library;

pub use library::{list_pdfs, FolderSelection};

const SETTINGS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub last_folder: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    settings: Settings,
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "PdfAutoscroll", "PdfAutoscroll")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }

        let bytes = fs::read(path)?;
        let envelope: SettingsEnvelope = serde_json::from_slice(&bytes)?;

        Ok(envelope.settings)
    }

    /// Like [`load_settings`](Self::load_settings), but a missing or
    /// unreadable file simply means there is no prior state.
    pub fn load_settings_or_default(&self) -> Settings {
        match self.load_settings() {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %self.settings_path().display(), %err, "ignoring unreadable settings");
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope =
            SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, settings: settings.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        debug!(path = %self.settings_path().display(), "settings saved");
        Ok(())
    }

    pub fn remember_folder(&self, folder: &Path) -> Result<(), StorageError> {
        let mut settings = self.load_settings_or_default();
        settings.last_folder = Some(folder.to_path_buf());
        self.save_settings(&settings)
    }

    /// PDFs of the remembered folder. Empty when nothing is remembered or the
    /// folder has gone away.
    pub fn last_folder_pdfs(&self) -> Vec<PathBuf> {
        let Some(folder) = self.load_settings_or_default().last_folder else {
            return Vec::new();
        };

        match list_pdfs(&folder) {
            Ok(files) => files,
            Err(err) => {
                debug!(folder = %folder.display(), %err, "remembered folder is unavailable");
                Vec::new()
            }
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }
}
