use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE: &str = "guwen.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            resources_dir: default_resources_dir(),
            music_dir: default_music_dir(),
            bind: default_bind(),
            dictionary: DictionaryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default = "default_dictionary_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_dictionary_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Apply `GUWEN_*` overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `GUWEN_BIND` is not a socket address.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("GUWEN_RESOURCES_DIR") {
            self.resources_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("GUWEN_MUSIC_DIR") {
            self.music_dir = PathBuf::from(dir);
        }
        if let Some(bind) = lookup("GUWEN_BIND") {
            self.bind = bind
                .parse()
                .with_context(|| format!("GUWEN_BIND is not a socket address: {bind}"))?;
        }
        if let Some(url) = lookup("GUWEN_DICTIONARY_URL") {
            self.dictionary.base_url = url;
        }
        Ok(())
    }
}

/// Parse a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config_file(path: &Path) -> Result<ServerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ServerConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Find and load the effective config file.
///
/// Order: `explicit` (must exist) → `<cwd>/guwen.toml` →
/// `<user config dir>/guwen/config.toml` → defaults.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Result<ServerConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let local = cwd.join(CONFIG_FILE);
    if local.exists() {
        return load_config_file(&local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join("guwen/config.toml");
        if user.exists() {
            return load_config_file(&user);
        }
    }

    Ok(ServerConfig::default())
}

/// Presentation toggles of a reading client.
///
/// Passed explicitly to whatever renders records; nothing reads these from
/// shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadingPreferences {
    #[serde(default)]
    pub show_translation_en: bool,
    #[serde(default)]
    pub show_translation_jp: bool,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default)]
    pub read_aloud: bool,
}

fn default_resources_dir() -> PathBuf {
    PathBuf::from("private/resources")
}

fn default_music_dir() -> PathBuf {
    PathBuf::from("public/background_music")
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_dictionary_url() -> String {
    "https://dict.youdao.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}
