use anyhow::Result;

use johnny_decimal::config::{Config, DEFAULT_MINIMUM_GROUPSPACE, JohnnyConfig};

use crate::Args;

/// Create the final config from command line args and the user config file.
/// Command line values take precedence.
pub fn from_args(args: Args) -> Result<Config> {
    let user_config = JohnnyConfig::get_user_config()?;
    Ok(merge(args, user_config))
}

fn merge(args: Args, user_config: JohnnyConfig) -> Config {
    Config {
        annotate_dates: !args.no_annotate && user_config.annotate_dates.unwrap_or(true),
        copy: args.copy || user_config.copy,
        debug: args.debug || user_config.debug,
        execute: args.execute || user_config.execute,
        force: args.force || user_config.force,
        minimum_groupspace: args
            .minimum_groupspace
            .or(user_config.minimum_groupspace)
            .unwrap_or(DEFAULT_MINIMUM_GROUPSPACE),
        overwrite: args.overwrite.or(user_config.overwrite).unwrap_or_default(),
        verbose: args.verbose || user_config.verbose,
    }
}

#[cfg(test)]
mod johnny_args_tests {
    use super::*;

    use clap::Parser;

    use johnny_decimal::copy::OverwritePolicy;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("johnny").chain(args.iter().copied())).expect("should parse args")
    }

    #[test]
    fn defaults_without_user_config() {
        let config = merge(parse(&["files.org"]), JohnnyConfig::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn args_enable_flags() {
        let config = merge(
            parse(&["files.org", "--copy", "--no-dry-run", "--force", "-m", "3", "-o", "skip-unless-newer"]),
            JohnnyConfig::default(),
        );
        assert!(config.copy);
        assert!(config.execute);
        assert!(config.force);
        assert_eq!(config.minimum_groupspace, 3);
        assert_eq!(config.overwrite, OverwritePolicy::SkipUnlessNewer);
    }

    #[test]
    fn args_override_user_config() {
        let user_config = JohnnyConfig::from_toml_str(
            r#"
[johnny]
minimum_groupspace = 5
overwrite = "skip-unless-newer"
annotate_dates = true
"#,
        )
        .unwrap();
        let config = merge(parse(&["files.org", "-m", "2", "-o", "fail", "--no-annotate"]), user_config);
        assert_eq!(config.minimum_groupspace, 2);
        assert_eq!(config.overwrite, OverwritePolicy::Fail);
        assert!(!config.annotate_dates);
    }

    #[test]
    fn user_config_fills_missing_args() {
        let user_config = JohnnyConfig::from_toml_str(
            r"
[johnny]
copy = true
minimum_groupspace = 5
annotate_dates = false
",
        )
        .unwrap();
        let config = merge(parse(&["files.org"]), user_config);
        assert!(config.copy);
        assert_eq!(config.minimum_groupspace, 5);
        assert!(!config.annotate_dates);
    }

    #[test]
    fn file_is_required() {
        assert!(Args::try_parse_from(["johnny"]).is_err());
        assert!(Args::try_parse_from(["johnny", "--completion", "bash"]).is_ok());
    }
}
