//! Typed key-value settings written by action links
//!
//! Stores are injected into the dispatcher, never reached through a global.
//! Writes are last-writer-wins; every store serializes its own writes.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Namespace used by the settings action
pub const GLOBAL_NAMESPACE: &str = "global";

static BOOLEAN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(true|false|t|f|1|0|y|n)$").unwrap());

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// A setting value after type classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{}", value),
            SettingValue::Int(value) => write!(f, "{}", value),
            SettingValue::Text(value) => f.write_str(value),
        }
    }
}

/// Classifies a raw value as boolean, integer or string (first match wins)
///
/// Boolean literals are `true/false/t/f/1/0/y/n` in any case, so `1` and `0`
/// come out as booleans. Integers that overflow `i64` stay strings.
///
/// # Examples
///
/// ```
/// use deeplink_router::action::settings::{coerce_setting_value, SettingValue};
///
/// assert_eq!(coerce_setting_value("Y"), SettingValue::Bool(true));
/// assert_eq!(coerce_setting_value("0"), SettingValue::Bool(false));
/// assert_eq!(coerce_setting_value("42"), SettingValue::Int(42));
/// assert_eq!(coerce_setting_value("staging"), SettingValue::Text("staging".into()));
/// ```
pub fn coerce_setting_value(raw: &str) -> SettingValue {
    if BOOLEAN_REGEX.is_match(raw) {
        let truthy = matches!(raw.to_ascii_lowercase().as_str(), "true" | "t" | "1" | "y");
        return SettingValue::Bool(truthy);
    }

    if INTEGER_REGEX.is_match(raw) {
        if let Ok(value) = raw.parse::<i64>() {
            return SettingValue::Int(value);
        }
    }

    SettingValue::Text(raw.to_string())
}

fn scoped_key(namespace: &str, key: &str) -> String {
    format!("{}.{}", namespace, key)
}

/// Durable key-value store scoped by namespace
pub trait SettingsStore: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Option<SettingValue>;

    fn set(&self, namespace: &str, key: &str, value: SettingValue) -> Result<()>;

    fn remove(&self, namespace: &str, key: &str) -> Result<Option<SettingValue>>;

    /// Keys stored under `namespace`, without the namespace part
    fn keys(&self, namespace: &str) -> Vec<String>;
}

/// In-memory settings store
///
/// Fast but non-persistent - values are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<BTreeMap<String, SettingValue>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|values| values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, namespace: &str, key: &str) -> Option<SettingValue> {
        let values = self.values.read().ok()?;
        values.get(&scoped_key(namespace, key)).cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: SettingValue) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        values.insert(scoped_key(namespace, key), value);
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<Option<SettingValue>> {
        let mut values = self
            .values
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(values.remove(&scoped_key(namespace, key)))
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        let prefix = format!("{}.", namespace);
        self.values
            .read()
            .map(|values| {
                values
                    .keys()
                    .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Settings persisted as a single JSON document
///
/// Every change rewrites the whole file and only becomes visible once the
/// write succeeded. Persistent across restarts, suitable for a single process.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, SettingValue>>,
}

impl FileSettings {
    /// Opens the store, loading existing values when the file exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file: {:?}", path))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse settings file: {:?}", path))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, SettingValue>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create settings directory")?;
            }
        }

        let json = serde_json::to_string_pretty(values).context("Failed to serialize settings")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write settings file: {:?}", self.path))
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, namespace: &str, key: &str) -> Option<SettingValue> {
        let values = self.values.lock().ok()?;
        values.get(&scoped_key(namespace, key)).cloned()
    }

    fn set(&self, namespace: &str, key: &str, value: SettingValue) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("settings lock poisoned"))?;

        let mut staged = values.clone();
        staged.insert(scoped_key(namespace, key), value);
        self.persist(&staged)?;
        *values = staged;
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<Option<SettingValue>> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        let scoped = scoped_key(namespace, key);
        if !values.contains_key(&scoped) {
            return Ok(None);
        }

        let mut staged = values.clone();
        let removed = staged.remove(&scoped);
        self.persist(&staged)?;
        *values = staged;
        Ok(removed)
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        let prefix = format!("{}.", namespace);
        self.values
            .lock()
            .map(|values| {
                values
                    .keys()
                    .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", SettingValue::Bool(true))]
    #[case("FALSE", SettingValue::Bool(false))]
    #[case("t", SettingValue::Bool(true))]
    #[case("n", SettingValue::Bool(false))]
    #[case("1", SettingValue::Bool(true))]
    #[case("0", SettingValue::Bool(false))]
    #[case("10", SettingValue::Int(10))]
    #[case("-7", SettingValue::Int(-7))]
    #[case("99999999999999999999", SettingValue::Text("99999999999999999999".into()))]
    #[case("yes", SettingValue::Text("yes".into()))]
    #[case("1.5", SettingValue::Text("1.5".into()))]
    fn test_coerce_setting_value(#[case] raw: &str, #[case] expected: SettingValue) {
        assert_eq!(coerce_setting_value(raw), expected);
    }

    #[test]
    fn test_memory_settings_namespaces() {
        let store = MemorySettings::new();
        store.set(GLOBAL_NAMESPACE, "apiTier", SettingValue::Text("staging".into())).unwrap();
        store.set("user", "apiTier", SettingValue::Bool(true)).unwrap();

        assert_eq!(
            store.get(GLOBAL_NAMESPACE, "apiTier"),
            Some(SettingValue::Text("staging".into()))
        );
        assert_eq!(store.keys(GLOBAL_NAMESPACE), vec!["apiTier".to_string()]);
        assert_eq!(store.len(), 2);

        assert_eq!(
            store.remove("user", "apiTier").unwrap(),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(store.get("user", "apiTier"), None);
    }

    #[test]
    fn test_memory_settings_last_writer_wins() {
        let store = MemorySettings::new();
        store.set(GLOBAL_NAMESPACE, "debug", SettingValue::Bool(false)).unwrap();
        store.set(GLOBAL_NAMESPACE, "debug", SettingValue::Int(3)).unwrap();
        assert_eq!(store.get(GLOBAL_NAMESPACE, "debug"), Some(SettingValue::Int(3)));
    }

    #[test]
    fn test_file_settings_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        {
            let store = FileSettings::open(&path).unwrap();
            store.set(GLOBAL_NAMESPACE, "showDebugMenu", SettingValue::Bool(true)).unwrap();
            store.set(GLOBAL_NAMESPACE, "retries", SettingValue::Int(3)).unwrap();
        }

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(
            reopened.get(GLOBAL_NAMESPACE, "showDebugMenu"),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(reopened.get(GLOBAL_NAMESPACE, "retries"), Some(SettingValue::Int(3)));
    }

    #[test]
    fn test_file_settings_failed_write_leaves_values_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let store = FileSettings::open(blocker.join("settings.json")).unwrap();
        assert!(store.set(GLOBAL_NAMESPACE, "debug", SettingValue::Bool(true)).is_err());
        assert_eq!(store.get(GLOBAL_NAMESPACE, "debug"), None);
        assert!(store.keys(GLOBAL_NAMESPACE).is_empty());
    }

    #[test]
    fn test_file_settings_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = FileSettings::open(&path).unwrap();
        store.set(GLOBAL_NAMESPACE, "retries", SettingValue::Int(3)).unwrap();
        assert_eq!(store.remove(GLOBAL_NAMESPACE, "missing").unwrap(), None);
        assert_eq!(
            store.remove(GLOBAL_NAMESPACE, "retries").unwrap(),
            Some(SettingValue::Int(3))
        );

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(reopened.get(GLOBAL_NAMESPACE, "retries"), None);
    }

    #[test]
    fn test_file_settings_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let error = FileSettings::open(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse settings file"));
    }
}
