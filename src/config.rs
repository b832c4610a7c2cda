use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resolved application configuration. Unknown providers in the file are
/// kept, so user-defined provider entries survive a load/save round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: BTreeMap<String, ProviderSettings>,
    pub default_provider: String,
    pub context_files: ContextFileSettings,
    pub branch: BranchSettings,
    pub commit: CommitSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextFileSettings {
    pub search_paths: Vec<String>,
    pub default_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BranchSettings {
    pub max_length: usize,
    pub include_prefixes: bool,
    pub include_ticket_numbers: bool,
    pub separator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitSettings {
    pub max_length: usize,
    pub include_scope: bool,
    pub conventional_commits: bool,
    pub include_body: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            "claude".to_string(),
            ProviderSettings {
                enabled: true,
                command: Some("claude-code".to_string()),
                ..ProviderSettings::default()
            },
        );
        providers.insert(
            "gemini".to_string(),
            ProviderSettings {
                enabled: false,
                command: Some("gemini-cli".to_string()),
                ..ProviderSettings::default()
            },
        );
        providers.insert(
            "api".to_string(),
            ProviderSettings {
                enabled: false,
                endpoint: Some("http://localhost:1234/v1/chat/completions".to_string()),
                api_key: Some(String::new()),
                model: Some("gpt-3.5-turbo".to_string()),
                ..ProviderSettings::default()
            },
        );

        Config {
            providers,
            default_provider: "claude".to_string(),
            context_files: ContextFileSettings::default(),
            branch: BranchSettings::default(),
            commit: CommitSettings::default(),
        }
    }
}

impl Default for ContextFileSettings {
    fn default() -> Self {
        ContextFileSettings {
            search_paths: vec![".".to_string(), ".github".to_string(), "docs".to_string()],
            default_file: "COMMITTER.md".to_string(),
        }
    }
}

impl Default for BranchSettings {
    fn default() -> Self {
        BranchSettings {
            max_length: 50,
            include_prefixes: true,
            include_ticket_numbers: true,
            separator: "/".to_string(),
        }
    }
}

impl Default for CommitSettings {
    fn default() -> Self {
        CommitSettings {
            max_length: 72,
            include_scope: true,
            conventional_commits: true,
            include_body: false,
        }
    }
}

/// A discovered context file, passed verbatim into prompts.
#[derive(Debug, Clone)]
pub struct ContextFile {
    pub path: PathBuf,
    pub content: String,
}

/// File-backed store at `~/.committer/config.json` with dotted-path access.
///
/// Writers are not synchronized; concurrent `set` calls from separate
/// processes can lose updates.
pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::with_dir(home.join(".committer")))
    }

    pub fn with_dir(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        ConfigStore {
            config_dir,
            config_file,
        }
    }

    fn ensure_config_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.config_dir).with_context(|| {
            format!("failed to create config directory {:?}", self.config_dir)
        })
    }

    /// Load the typed config, writing defaults on first run. File values
    /// override defaults key by key; missing sections fall back.
    pub fn load(&self) -> Result<Config> {
        let raw = self.load_raw()?;
        serde_json::from_value(raw).context("failed to interpret config file")
    }

    /// Raw JSON view of the config file, defaults merged in.
    fn load_raw(&self) -> Result<Value> {
        self.ensure_config_dir()?;

        if !self.config_file.exists() {
            let defaults = Config::default();
            self.save(&defaults)?;
            return Ok(serde_json::to_value(&defaults)?);
        }

        let data = fs::read_to_string(&self.config_file)
            .with_context(|| format!("failed to read config file {:?}", self.config_file))?;
        let file_value: Value = serde_json::from_str(&data)
            .with_context(|| format!("config file {:?} is not valid JSON", self.config_file))?;

        let mut merged = serde_json::to_value(Config::default())?;
        merge_objects(&mut merged, file_value);
        Ok(merged)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        self.ensure_config_dir()?;
        let data = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_file, data)
            .with_context(|| format!("failed to write config file {:?}", self.config_file))
    }

    /// Read a value at a dotted path, e.g. `providers.api.endpoint`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw = self.load_raw()?;
        Ok(get_path(&raw, key).cloned())
    }

    /// Write a value at a dotted path, creating intermediate objects.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut raw = self.load_raw()?;
        set_path(&mut raw, key, value)?;

        // Round-trip through the typed config would drop unknown keys, so
        // the raw document is written back directly.
        self.ensure_config_dir()?;
        let data = serde_json::to_string_pretty(&raw)?;
        fs::write(&self.config_file, data)
            .with_context(|| format!("failed to write config file {:?}", self.config_file))
    }

    /// Find the context file to feed into prompts. An explicit path must
    /// exist; otherwise the configured search paths are probed for the
    /// default file name. No file at all is fine.
    pub fn find_context_file(&self, custom: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(custom) = custom {
            let path = PathBuf::from(custom);
            if !path.exists() {
                return Err(anyhow!("Context file not found: {custom}"));
            }
            return Ok(Some(path));
        }

        let config = self.load()?;
        for search_path in &config.context_files.search_paths {
            let candidate = Path::new(search_path).join(&config.context_files.default_file);
            if candidate.exists() {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    pub fn read_context_file(&self, path: Option<PathBuf>) -> Result<Option<ContextFile>> {
        let Some(path) = path else {
            return Ok(None);
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read context file {:?}", path))?;
        Ok(Some(ContextFile {
            path,
            content: content.trim().to_string(),
        }))
    }
}

/// Shallow-recursive merge: objects merge key by key, everything else is
/// replaced by the incoming value.
fn merge_objects(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_objects(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base_slot, incoming) => *base_slot = incoming,
    }
}

fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| current.get(key))
}

fn set_path(value: &mut Value, path: &str, new_value: Value) -> Result<()> {
    let mut keys = path.split('.').peekable();
    let mut current = value;

    while let Some(key) = keys.next() {
        if keys.peek().is_none() {
            let Value::Object(map) = current else {
                return Err(anyhow!("config path '{path}' does not lead to an object"));
            };
            map.insert(key.to_string(), new_value);
            return Ok(());
        }

        let Value::Object(map) = current else {
            return Err(anyhow!("config path '{path}' does not lead to an object"));
        };
        current = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }

    Ok(())
}
