//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ideaforge_models::{ConfigError, TeamConfig};

/// Ideaforge - run a team of AI agents through a structured ideation session
#[derive(Parser, Debug)]
#[command(name = "ideaforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Topic to explore (prompted for when omitted)
    pub topic: Option<String>,

    /// Team preset
    #[arg(short, long, value_enum, default_value_t = TeamPreset::Standard)]
    pub team: TeamPreset,

    /// YAML team configuration file (overrides --team)
    #[arg(short, long, env = "IDEAFORGE_TEAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of exploration rounds (overrides the team setting)
    #[arg(short, long)]
    pub rounds: Option<u32>,

    /// Where to write the report (default: idea_sheet_<unix time>.html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// API key to use when no LLM_API_KEY is set
    #[arg(long)]
    pub api_key: Option<String>,

    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Named team compositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TeamPreset {
    /// Leader, ideation, moderator and report writer; one round
    Default,
    /// Same as default
    Standard,
    /// Adds researcher and critic; two rounds
    Extended,
    /// Every role; three rounds
    Full,
}

impl TeamPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Standard => "standard",
            Self::Extended => "extended",
            Self::Full => "full",
        }
    }
}

impl Cli {
    /// Log level derived from `-v` flags.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Team configuration from `--config` or `--team`, with `--rounds`
    /// applied on top.
    pub fn team_config(&self) -> Result<TeamConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => TeamConfig::from_yaml_file(path)?,
            None => TeamConfig::preset(self.team.as_str())?,
        };
        if let Some(rounds) = self.rounds {
            config = config.with_max_rounds(rounds);
        }
        config.validate()?;
        Ok(config)
    }

    /// Report path, defaulting to a timestamped file in the working directory.
    pub fn output_path(&self, unix_time: i64) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("idea_sheet_{}.html", unix_time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_models::AgentRole;
    use std::io::Write;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["ideaforge"]);
        assert!(cli.topic.is_none());
        assert_eq!(cli.team, TeamPreset::Standard);
        assert_eq!(cli.log_level(), tracing::Level::WARN);
        assert_eq!(cli.team_config().unwrap(), TeamConfig::standard());
    }

    #[test]
    fn test_cli_parse_topic_and_flags() {
        let cli = Cli::parse_from([
            "ideaforge",
            "reduce plastic waste",
            "--team",
            "extended",
            "--rounds",
            "3",
            "-o",
            "report.html",
            "-vv",
        ]);
        assert_eq!(cli.topic.as_deref(), Some("reduce plastic waste"));
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
        assert_eq!(cli.output_path(0), PathBuf::from("report.html"));

        let config = cli.team_config().unwrap();
        assert_eq!(config.max_rounds, 3);
        assert!(config.includes(AgentRole::Critic));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let cli = Cli::parse_from(["ideaforge", "--rounds", "0"]);
        assert!(matches!(
            cli.team_config(),
            Err(ConfigError::InvalidRounds(0))
        ));
    }

    #[test]
    fn test_default_output_path() {
        let cli = Cli::parse_from(["ideaforge"]);
        assert_eq!(
            cli.output_path(1_700_000_000),
            PathBuf::from("idea_sheet_1700000000.html")
        );
    }

    #[test]
    fn test_config_file_overrides_preset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "include_implementer: true\nmax_rounds: 2").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["ideaforge", "--team", "full", "--config", &path]);
        let config = cli.team_config().unwrap();

        assert!(config.includes(AgentRole::Implementer));
        assert!(!config.includes(AgentRole::Researcher));
        assert_eq!(config.max_rounds, 2);
    }
}
