use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_DASHBOARD_BIND, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_PORT, DEFAULT_RESPONSES_DIR,
    DEFAULT_SEPARATOR_WIDTH, DEFAULT_SUPERSET_PROMPT,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Ollama server connection
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Where and how output files are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Superset document synthesis
    #[serde(default)]
    pub superset: SupersetConfig,

    /// Web dashboard
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    /// Ollama server host, optionally with scheme, port and path
    pub host: String,
    /// Ollama server port, used when `host` names none
    pub port: u16,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            port: DEFAULT_OLLAMA_PORT,
        }
    }
}

impl OllamaConfig {
    /// Base URL of the Ollama HTTP API, e.g. `http://localhost:11434`
    ///
    /// A port given in `host` (as in `OLLAMA_HOST=http://box:11434`) wins over `port`.
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        let (scheme, rest) = host.split_once("://").unwrap_or(("http", host));
        let (authority, path) = rest.split_at(rest.find('/').unwrap_or(rest.len()));

        // Skip past an IPv6 literal so its colons are not taken for a port
        let after_address = authority.rfind(']').map_or(authority, |end| &authority[end..]);
        if after_address.contains(':') {
            format!("{}://{}{}", scheme, authority, path)
        } else {
            format!("{}://{}:{}{}", scheme, authority, self.port, path)
        }
    }
}

/// Output file configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Directory every output file is written to
    pub responses_dir: PathBuf,
    /// Width of the `=` line under each model header
    pub separator_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            responses_dir: PathBuf::from(DEFAULT_RESPONSES_DIR),
            separator_width: DEFAULT_SEPARATOR_WIDTH,
        }
    }
}

/// Superset synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupersetConfig {
    /// System message placed before the combined responses
    pub system_prompt: String,
}

impl Default for SupersetConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SUPERSET_PROMPT.to_string(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Socket address the dashboard listens on
    pub bind: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_DASHBOARD_BIND.to_string(),
        }
    }
}

/// Build the layered figment: defaults, then each existing TOML file in order
fn build_figment(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    for file in files {
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }
    }

    figment
}

/// Load configuration from multiple sources
///
/// Global config, then `.lmi/config.toml`, then `explicit`, then `LMI_` env vars.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut files = vec![
        get_config_dir()?.join("config.toml"),
        PathBuf::from(".lmi/config.toml"),
    ];

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        files.push(path.to_path_buf());
    }

    // Nested keys use a double underscore: LMI_OLLAMA__HOST
    build_figment(&files)
        .merge(Env::prefixed("LMI_").split("__"))
        .extract()
        .context("Failed to load configuration")
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "lmi") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("lmi"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist
///
/// Returns the path of the global config file.
pub fn init_config() -> Result<PathBuf> {
    let config_file = get_config_dir()?.join("config.toml");

    if !config_file.exists() {
        save_config(&Config::default(), &config_file)?;
        tracing::info!("Created default configuration at {}", config_file.display());
    }

    Ok(config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config: Config = build_figment(&[]).extract().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ollama.base_url(), "http://localhost:11434");
        assert_eq!(config.output.responses_dir, PathBuf::from("responses"));
        assert_eq!(config.output.separator_width, 20);
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let local = temp_dir.path().join("local.toml");
        std::fs::write(&global, "[ollama]\nhost = \"gpu-box\"\nport = 9999\n").unwrap();
        std::fs::write(&local, "[ollama]\nport = 11500\n\n[output]\nresponses_dir = \"out\"\n")
            .unwrap();

        let config: Config = build_figment(&[global, local, temp_dir.path().join("missing.toml")])
            .extract()
            .unwrap();

        assert_eq!(config.ollama.host, "gpu-box");
        assert_eq!(config.ollama.port, 11500);
        assert_eq!(config.output.responses_dir, PathBuf::from("out"));
        assert_eq!(config.output.separator_width, 20);
        assert_eq!(config.superset, SupersetConfig::default());
    }

    #[test]
    fn test_base_url_keeps_explicit_scheme() {
        let ollama = OllamaConfig {
            host: "https://ollama.internal/".to_string(),
            port: 443,
        };
        assert_eq!(ollama.base_url(), "https://ollama.internal:443");
    }

    #[test]
    fn test_base_url_keeps_port_given_in_host() {
        let cases = [
            ("http://localhost:11434", 11434, "http://localhost:11434"),
            ("http://localhost:11434/", 9999, "http://localhost:11434"),
            ("gpu-box:11500", 11434, "http://gpu-box:11500"),
            ("[::1]", 11434, "http://[::1]:11434"),
            ("http://[::1]:8080", 11434, "http://[::1]:8080"),
            ("https://proxy.internal/ollama", 8443, "https://proxy.internal:8443/ollama"),
        ];

        for (host, port, expected) in cases {
            let ollama = OllamaConfig {
                host: host.to_string(),
                port,
            };
            assert_eq!(ollama.base_url(), expected, "host {:?}", host);
        }
    }

    /// Run `f` with an isolated cwd and config home so no real config file leaks in
    fn with_clean_env(f: impl FnOnce(&mut figment::Jail) -> figment::Result<()>) {
        figment::Jail::expect_with(|jail| {
            let home = jail.directory().to_string_lossy().into_owned();
            jail.set_env("HOME", &home);
            jail.set_env("XDG_CONFIG_HOME", &home);
            f(jail)
        });
    }

    #[test]
    fn test_load_config_layers_local_explicit_and_env() {
        with_clean_env(|jail| {
            std::fs::create_dir_all(".lmi").unwrap();
            jail.create_file(
                ".lmi/config.toml",
                "[ollama]\nhost = \"gpu-box\"\nport = 1111\n",
            )?;
            jail.create_file(
                "custom.toml",
                "[ollama]\nport = 2222\n\n[output]\nresponses_dir = \"answers\"\n",
            )?;
            jail.set_env("LMI_OLLAMA__PORT", "9000");
            jail.set_env("LMI_DASHBOARD__BIND", "0.0.0.0:9001");

            let config = load_config(Some(Path::new("custom.toml"))).unwrap();

            assert_eq!(config.ollama.host, "gpu-box");
            assert_eq!(config.ollama.port, 9000);
            assert_eq!(config.output.responses_dir, PathBuf::from("answers"));
            assert_eq!(config.dashboard.bind, "0.0.0.0:9001");
            assert_eq!(config.superset, SupersetConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_config_without_files_uses_defaults() {
        with_clean_env(|_| {
            assert_eq!(load_config(None).unwrap(), Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_config_missing_explicit_file_fails() {
        with_clean_env(|_| {
            let err = load_config(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(err.to_string().contains("Config file not found: nope.toml"));
            Ok(())
        });
    }

    #[test]
    fn test_save_then_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.dashboard.bind = "0.0.0.0:9000".to_string();
        save_config(&config, &path).unwrap();

        let loaded: Config = build_figment(&[path]).extract().unwrap();
        assert_eq!(loaded, config);
    }
}
