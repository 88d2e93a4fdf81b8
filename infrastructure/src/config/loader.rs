//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["dbchat.toml", ".dbchat.toml"];

/// Shorthand environment variables and the keys they set
const ENV_SHORTHANDS: [(&str, &str); 3] = [
    ("DBCHAT_MODEL", "model.name"),
    ("DBCHAT_MAX_STEPS", "agent.max_steps"),
    ("DBCHAT_SANDBOX", "agent.sandbox"),
];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `DBCHAT_MODEL`, `DBCHAT_MAX_STEPS`, `DBCHAT_SANDBOX`,
    ///    and `DBCHAT_<SECTION>__<KEY>` for everything else
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./dbchat.toml` or `./.dbchat.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/dbchat/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        for (var, key) in ENV_SHORTHANDS {
            figment = figment.merge(Env::raw().only(&[var]).map(move |_| key.into()));
        }

        figment.merge(
            Env::prefixed("DBCHAT_")
                .split("__")
                .ignore(&["model", "max_steps", "sandbox"]),
        )
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dbchat").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        for (var, key) in ENV_SHORTHANDS {
            let mark = if std::env::var_os(var).is_some() {
                "SET  "
            } else {
                "     "
            };
            println!("  [{}] Env:     {} -> {}", mark, var, key);
        }

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        match Self::project_config_path() {
            Some(path) => println!("  [FOUND] Project: {}", path.display()),
            None => println!("  [     ] Project: ./dbchat.toml or ./.dbchat.toml"),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Global:  {}", mark, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.agent.sandbox);
        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.routing.classifier, "heuristic");
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.ends_with("dbchat/config.toml"));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[agent]\nrow_limit = 50\n\n[export]\ndirectory = \"/tmp/dbchat-exports\""
        )
        .unwrap();

        let config = ConfigLoader::load(Some(file.path())).unwrap();
        assert_eq!(config.agent.row_limit, 50);
        assert_eq!(config.export.directory, "/tmp/dbchat-exports");
        // untouched sections keep their defaults
        assert_eq!(config.export.format, "text");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\nrow_limit = \"lots\"").unwrap();

        assert!(ConfigLoader::load(Some(file.path())).is_err());
    }
}
