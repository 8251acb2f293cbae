//! Local key/value storage for the API key and user settings.
//!
//! Entries live in one JSON file under the platform config dir. Keys carry
//! the `sunset_art_lens_` prefix. The API key is obfuscated, not encrypted.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use shared::settings::{ApiProvider, AppSettings, SettingsPatch, Theme};
use shared::Credential;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

const STORAGE_PREFIX: &str = "sunset_art_lens_";
const API_KEY_ENTRY: &str = "api_key";
const SETTINGS_ENTRY: &str = "settings";

/// Default key baked in at build time, used when nothing is stored
const BUILD_DEFAULT_API_KEY: Option<&str> = option_env!("SUNSET_ART_LENS_API_KEY");

fn entry_key(name: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, name)
}

/// Reversible encoding so the key is not stored as plain text
pub fn obfuscate(text: &str) -> String {
    STANDARD.encode(urlencoding::encode(text).as_bytes())
}

/// Inverse of [`obfuscate`]; malformed input yields an empty string
pub fn deobfuscate(text: &str) -> String {
    STANDARD
        .decode(text.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|encoded| urlencoding::decode(&encoded).ok().map(|s| s.into_owned()))
        .unwrap_or_default()
}

/// Storage location for the default on-disk store
pub fn default_storage_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com.local", "Sunset Art Lens", "SunsetArtLens")
        .map(|proj| proj.config_dir().join("storage.json"))
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
    default_api_key: Option<String>,
    changes: watch::Sender<AppSettings>,
}

impl SettingsStore {
    /// Open the store at the platform config location
    pub fn open_default() -> Result<Self> {
        let path = default_storage_path().context("no config directory for this platform")?;
        Self::open(path)
    }

    /// Open a file-backed store. A missing file starts empty; an unreadable
    /// one is logged and ignored.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "ignoring corrupt settings file: {}", e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        Ok(Self::with_entries(Some(path), entries))
    }

    /// Store without a disk file, for tests and embedders
    pub fn in_memory() -> Self {
        Self::with_entries(None, BTreeMap::new())
    }

    fn with_entries(path: Option<PathBuf>, entries: BTreeMap<String, String>) -> Self {
        let settings = parse_settings(entries.get(&entry_key(SETTINGS_ENTRY)));
        let (changes, _) = watch::channel(settings);
        Self {
            path,
            entries: Mutex::new(entries),
            default_api_key: BUILD_DEFAULT_API_KEY.map(str::to_string),
            changes,
        }
    }

    /// Override the build-time fallback key
    pub fn with_default_api_key(mut self, key: Option<String>) -> Self {
        self.default_api_key = key;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stored key, else the default key, else `None`
    pub fn api_key(&self) -> Option<Credential> {
        let stored = self.entries.lock().get(&entry_key(API_KEY_ENTRY)).cloned();
        if let Some(stored) = stored {
            // A stored but undecodable key counts as no key at all
            return Credential::new(deobfuscate(&stored));
        }
        self.default_api_key.clone().and_then(|key| Credential::new(key))
    }

    pub fn set_api_key(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return self.remove_api_key();
        }
        self.write(|entries| {
            entries.insert(entry_key(API_KEY_ENTRY), obfuscate(key));
            Ok(())
        })
    }

    pub fn remove_api_key(&self) -> Result<()> {
        self.write(|entries| {
            entries.remove(&entry_key(API_KEY_ENTRY));
            Ok(())
        })
    }

    pub fn settings(&self) -> AppSettings {
        parse_settings(self.entries.lock().get(&entry_key(SETTINGS_ENTRY)))
    }

    /// Merge `patch` into the stored settings and return the result
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        self.write(|entries| {
            let key = entry_key(SETTINGS_ENTRY);
            let mut merged = parse_settings(entries.get(&key));
            merged.merge(patch);
            entries.insert(key, serde_json::to_string(&merged)?);
            Ok(merged)
        })
    }

    pub fn theme(&self) -> Theme {
        self.settings().theme
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.update_settings(SettingsPatch {
            theme: Some(theme),
            ..Default::default()
        })
        .map(|_| ())
    }

    pub fn api_provider(&self) -> ApiProvider {
        self.settings().api_provider
    }

    pub fn set_api_provider(&self, provider: ApiProvider) -> Result<()> {
        self.update_settings(SettingsPatch {
            api_provider: Some(provider),
            ..Default::default()
        })
        .map(|_| ())
    }

    /// Receives the current settings after every write, key changes included
    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.changes.subscribe()
    }

    /// Apply, persist and notify under one lock so writers reach the disk
    /// and subscribers in the order they ran
    fn write<T>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>) -> Result<T>,
    ) -> Result<T> {
        let mut entries = self.entries.lock();
        let mut staged = entries.clone();
        let value = apply(&mut staged)?;
        if let Some(path) = &self.path {
            persist(path, &staged)?;
        }
        *entries = staged;
        self.changes
            .send_replace(parse_settings(entries.get(&entry_key(SETTINGS_ENTRY))));
        Ok(value)
    }
}

fn parse_settings(raw: Option<&String>) -> AppSettings {
    match raw {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!("stored settings unreadable, using defaults: {}", e);
            AppSettings::default()
        }),
        None => AppSettings::default(),
    }
}

fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
