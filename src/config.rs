//! Run options and the user config file.

use std::path::PathBuf;
use std::sync::LazyLock;
use std::{fmt, fs};

use anyhow::Context;
use serde::Deserialize;

use crate::copy::OverwritePolicy;

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Default for the minimum number of unused subgroup numbers per group.
pub const DEFAULT_MINIMUM_GROUPSPACE: usize = 10;

/// Path to the user config file: `$HOME/.config/johnny-decimal.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct JohnnyConfig {
    #[serde(default)]
    pub annotate_dates: Option<bool>,
    #[serde(default)]
    pub copy: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub execute: bool,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub minimum_groupspace: Option<usize>,
    #[serde(default)]
    pub overwrite: Option<OverwritePolicy>,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    johnny: JohnnyConfig,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keep `[YYYY-MM-DD]` annotations in the rewritten table.
    pub annotate_dates: bool,
    /// Run the copy phase after updating the document.
    pub copy: bool,
    pub debug: bool,
    /// Actually copy files instead of only printing the plan.
    pub execute: bool,
    /// Copy in spite of warnings.
    pub force: bool,
    pub minimum_groupspace: usize,
    pub overwrite: OverwritePolicy,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotate_dates: true,
            copy: false,
            debug: false,
            execute: false,
            force: false,
            minimum_groupspace: DEFAULT_MINIMUM_GROUPSPACE,
            overwrite: OverwritePolicy::default(),
            verbose: false,
        }
    }
}

impl JohnnyConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.johnny)
            .with_context(|| "Failed to parse config TOML")
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  annotate dates:     {}", crate::colorize_bool(self.annotate_dates))?;
        writeln!(f, "  copy:               {}", crate::colorize_bool(self.copy))?;
        writeln!(f, "  execute:            {}", crate::colorize_bool(self.execute))?;
        writeln!(f, "  force:              {}", crate::colorize_bool(self.force))?;
        writeln!(f, "  minimum groupspace: {}", self.minimum_groupspace)?;
        writeln!(f, "  overwrite:          {}", self.overwrite)?;
        writeln!(f, "  verbose:            {}", crate::colorize_bool(self.verbose))
    }
}

#[cfg(test)]
mod johnny_config_tests {
    use super::*;

    #[test]
    fn from_toml_str_parses_empty_config() {
        let config = JohnnyConfig::from_toml_str("").expect("should parse empty config");
        assert!(!config.copy);
        assert!(!config.execute);
        assert!(!config.force);
        assert!(config.annotate_dates.is_none());
        assert!(config.minimum_groupspace.is_none());
        assert!(config.overwrite.is_none());
    }

    #[test]
    fn from_toml_str_parses_johnny_section() {
        let toml = r#"
[johnny]
annotate_dates = false
copy = true
execute = true
force = true
minimum_groupspace = 4
overwrite = "skip-unless-newer"
verbose = true
"#;
        let config = JohnnyConfig::from_toml_str(toml).expect("should parse config");
        assert_eq!(config.annotate_dates, Some(false));
        assert!(config.copy);
        assert!(config.execute);
        assert!(config.force);
        assert_eq!(config.minimum_groupspace, Some(4));
        assert_eq!(config.overwrite, Some(OverwritePolicy::SkipUnlessNewer));
        assert!(config.verbose);
    }

    #[test]
    fn from_toml_str_rejects_unknown_policy() {
        let toml = r#"
[johnny]
overwrite = "sometimes"
"#;
        assert!(JohnnyConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn from_toml_str_ignores_other_sections() {
        let toml = r"
[other_tool]
verbose = true

[johnny]
debug = true
";
        let config = JohnnyConfig::from_toml_str(toml).expect("should parse config");
        assert!(config.debug);
        assert!(!config.verbose);
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = Config::default();
        assert!(config.annotate_dates);
        assert!(!config.copy);
        assert!(!config.execute);
        assert_eq!(config.minimum_groupspace, 10);
        assert_eq!(config.overwrite, OverwritePolicy::Fail);
    }
}
