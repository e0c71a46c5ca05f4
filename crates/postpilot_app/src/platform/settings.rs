use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use pilot_logging::{pilot_info, pilot_warn};
use postpilot_engine::{EngineConfig, DEFAULT_FEED_URL, DEFAULT_MODEL};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "postpilot.ron";

const DEFAULT_PROMPTS: [&str; 3] = [
    "The post should be about the importance of embracing change and constantly learning new \
     skills (both technical and soft skills). Mention that this proactive approach is key to not \
     getting left behind in the fast-paced tech industry. The tone should be positive and \
     motivational. Include relevant hashtags such as: #SoftwareDeveloper #AI #Upskilling \
     #FutureOfWork #Tech",
    "Write about the latest trends in AI and machine learning. Focus on practical applications \
     and how developers can leverage these technologies. The tone should be informative and \
     engaging. Include hashtags: #AI #MachineLearning #DevCommunity #TechTrends #Innovation",
    "Discuss the importance of clean code and best practices in software development. Mention \
     how good coding practices lead to maintainable and scalable applications. The tone should \
     be educational and professional. Include hashtags: #CleanCode #SoftwareDevelopment \
     #BestPractices #CodeQuality #Programming",
];

/// User-editable settings, read from a RON file. Every field is optional in
/// the file; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    /// Prompts used by `run-once` (first) and `schedule` (rotating).
    pub prompts: Vec<String>,
    /// Forum board posts are submitted to.
    pub subreddit: String,
    pub feed_url: String,
    pub model: String,
    /// Default cadence for `schedule` without `--every` or `--cron`.
    pub interval_minutes: u64,
    pub headline_limit: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            prompts: DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect(),
            subreddit: "test".to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            interval_minutes: 60,
            headline_limit: 10,
        }
    }
}

impl AppSettings {
    /// Loads settings from `explicit`, or from [`DEFAULT_SETTINGS_FILE`] if it
    /// exists. An explicit path that cannot be read is an error.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !default.exists() {
                    pilot_info!("No {} found; using default settings", DEFAULT_SETTINGS_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::parse(&content)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        pilot_info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut settings: Self = ron::from_str(content)?;
        settings.normalize()?;
        Ok(settings)
    }

    fn normalize(&mut self) -> anyhow::Result<()> {
        let before = self.prompts.len();
        self.prompts = self
            .prompts
            .iter()
            .map(|prompt| prompt.trim().to_string())
            .filter(|prompt| !prompt.is_empty())
            .collect();
        if self.prompts.len() != before {
            pilot_warn!("Ignored {} blank prompt(s) in settings", before - self.prompts.len());
        }

        self.subreddit = self.subreddit.trim().trim_start_matches("r/").to_string();
        if self.subreddit.is_empty() {
            bail!("subreddit must not be empty");
        }
        if self.interval_minutes == 0 {
            bail!("interval_minutes must be at least 1");
        }
        if self.interval_minutes.checked_mul(60).is_none() {
            bail!("interval_minutes {} is too large", self.interval_minutes);
        }
        if self.headline_limit == 0 {
            bail!("headline_limit must be at least 1");
        }
        Ok(())
    }

    /// First configured prompt, for single runs.
    pub fn first_prompt(&self) -> Option<&str> {
        self.prompts.first().map(String::as_str)
    }

    /// Engine configuration for these settings on top of `base`, which
    /// carries the credentials.
    pub fn engine_config(&self, base: EngineConfig) -> EngineConfig {
        EngineConfig {
            model: self.model.clone(),
            feed_url: self.feed_url.clone(),
            ..base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = AppSettings::parse(
            r#"(
                prompts: ["  Write about Rust async  ", "   "],
                subreddit: "r/rust",
            )"#,
        )
        .unwrap();
        assert_eq!(settings.prompts, vec!["Write about Rust async".to_string()]);
        assert_eq!(settings.subreddit, "rust");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.interval_minutes, 60);
        assert_eq!(settings.headline_limit, 10);
    }

    #[test]
    fn defaults_rotate_three_prompts() {
        let settings = AppSettings::default();
        assert_eq!(settings.prompts.len(), 3);
        assert_eq!(settings.subreddit, "test");
        assert!(settings.first_prompt().unwrap().contains("embracing change"));
    }

    #[test]
    fn malformed_or_invalid_files_are_errors() {
        assert!(AppSettings::parse("(prompts: [").is_err());
        assert!(AppSettings::parse("(unknown_field: 1)").is_err());
        let err = AppSettings::parse("(interval_minutes: 0)").unwrap_err();
        assert!(err.to_string().contains("interval_minutes"));
        let err = AppSettings::parse(&format!("(interval_minutes: {})", u64::MAX)).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"(model: "gemini-1.5-pro", headline_limit: 3)"#).unwrap();

        let settings = AppSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.model, "gemini-1.5-pro");
        assert_eq!(settings.headline_limit, 3);

        let config = settings.engine_config(EngineConfig::default());
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ron");
        let err = AppSettings::load(Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("reading settings"));
    }
}
