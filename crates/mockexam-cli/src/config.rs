//! `mockexam.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mockexam_core::progress::HistoryPolicy;
use mockexam_core::session::SessionConfig;

/// Top-level mockexam configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockexamConfig {
    /// Directory holding the `.tex` question bank.
    #[serde(default = "default_problems_dir")]
    pub problems_dir: PathBuf,
    /// Where progress is persisted.
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,
    /// Where generated exam papers are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Questions per exam when `--count` is not given.
    #[serde(default = "default_questions")]
    pub default_questions: usize,
    /// Upper bound accepted for `--count`.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    #[serde(default)]
    pub one_per_topic: bool,
    #[serde(default)]
    pub history_on_reset: HistoryPolicy,
    #[serde(default)]
    pub reset_on_shortfall: bool,
    /// Fixed RNG seed for reproducible exams.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_problems_dir() -> PathBuf {
    PathBuf::from("problems")
}
fn default_progress_file() -> PathBuf {
    PathBuf::from("progress.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_questions() -> usize {
    5
}
fn default_max_questions() -> usize {
    50
}

impl Default for MockexamConfig {
    fn default() -> Self {
        Self {
            problems_dir: default_problems_dir(),
            progress_file: default_progress_file(),
            output_dir: default_output_dir(),
            default_questions: default_questions(),
            max_questions: default_max_questions(),
            one_per_topic: false,
            history_on_reset: HistoryPolicy::default(),
            reset_on_shortfall: false,
            seed: None,
        }
    }
}

impl MockexamConfig {
    /// The policy part handed to the session controller.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            history_on_reset: self.history_on_reset,
            reset_on_shortfall: self.reset_on_shortfall,
        }
    }

    /// Check that `count` is an acceptable exam size.
    pub fn check_count(&self, count: usize) -> Result<()> {
        if count == 0 || count > self.max_questions {
            anyhow::bail!(
                "question count must be between 1 and {}, got {count}",
                self.max_questions
            );
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("MOCKEXAM_PROBLEMS_DIR") {
            self.problems_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("MOCKEXAM_PROGRESS_FILE") {
            self.progress_file = PathBuf::from(file);
        }
        if let Some(seed) = lookup("MOCKEXAM_SEED") {
            let seed = seed
                .trim()
                .parse::<u64>()
                .with_context(|| format!("MOCKEXAM_SEED is not a valid seed: {seed:?}"))?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    fn resolve_paths(&mut self) {
        self.problems_dir = resolve_path(&self.problems_dir);
        self.progress_file = resolve_path(&self.progress_file);
        self.output_dir = resolve_path(&self.output_dir);
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        // Substituted text is not expanded again.
        from = start + value.len();
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains("${") => PathBuf::from(resolve_env_vars(s)),
        _ => path.to_path_buf(),
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. the explicit path, which must exist
/// 2. `mockexam.toml` in the current directory
/// 3. `~/.config/mockexam/config.toml`
///
/// Environment variable overrides: `MOCKEXAM_PROBLEMS_DIR`,
/// `MOCKEXAM_PROGRESS_FILE`, `MOCKEXAM_SEED`.
pub fn load_config_from(path: Option<&Path>) -> Result<MockexamConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("mockexam.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("using config {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MockexamConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MockexamConfig::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.resolve_paths();
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mockexam"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_MOCKEXAM_TEST_VAR", "bank");
        assert_eq!(resolve_env_vars("${_MOCKEXAM_TEST_VAR}"), "bank");
        assert_eq!(
            resolve_path(Path::new("/data/${_MOCKEXAM_TEST_VAR}/tex")),
            PathBuf::from("/data/bank/tex")
        );
        std::env::remove_var("_MOCKEXAM_TEST_VAR");
    }

    #[test]
    fn self_referencing_value_is_expanded_once() {
        std::env::set_var("_MOCKEXAM_SELF_VAR", "${_MOCKEXAM_SELF_VAR}");
        assert_eq!(
            resolve_env_vars("${_MOCKEXAM_SELF_VAR}/x"),
            "${_MOCKEXAM_SELF_VAR}/x"
        );
        std::env::remove_var("_MOCKEXAM_SELF_VAR");
    }

    #[test]
    fn multiple_references_are_all_expanded() {
        std::env::set_var("_MOCKEXAM_ROOT_VAR", "/srv");
        std::env::set_var("_MOCKEXAM_LEAF_VAR", "bank");
        assert_eq!(
            resolve_env_vars("${_MOCKEXAM_ROOT_VAR}/${_MOCKEXAM_LEAF_VAR}"),
            "/srv/bank"
        );
        std::env::remove_var("_MOCKEXAM_ROOT_VAR");
        std::env::remove_var("_MOCKEXAM_LEAF_VAR");
    }

    #[test]
    fn unterminated_reference_is_left_alone() {
        assert_eq!(resolve_env_vars("${NOPE"), "${NOPE");
    }

    #[test]
    fn default_config() {
        let config = MockexamConfig::default();
        assert_eq!(config.problems_dir, PathBuf::from("problems"));
        assert_eq!(config.default_questions, 5);
        assert_eq!(config.max_questions, 50);
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
problems_dir = "bank"
default_questions = 8
history_on_reset = "clear"
reset_on_shortfall = true
seed = 42
"#;
        let config: MockexamConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.problems_dir, PathBuf::from("bank"));
        assert_eq!(config.progress_file, PathBuf::from("progress.json"));
        assert_eq!(config.default_questions, 8);
        assert_eq!(config.seed, Some(42));
        let session = config.session_config();
        assert_eq!(session.history_on_reset, HistoryPolicy::Clear);
        assert!(session.reset_on_shortfall);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("MOCKEXAM_PROBLEMS_DIR", "/srv/problems"),
            ("MOCKEXAM_SEED", " 7 "),
        ]
        .into_iter()
        .collect();
        let mut config = MockexamConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.problems_dir, PathBuf::from("/srv/problems"));
        assert_eq!(config.progress_file, PathBuf::from("progress.json"));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn invalid_seed_override_fails() {
        let mut config = MockexamConfig::default();
        let err = config
            .apply_env_overrides(|key| (key == "MOCKEXAM_SEED").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("MOCKEXAM_SEED"));
    }

    #[test]
    fn check_count_bounds() {
        let config = MockexamConfig::default();
        assert!(config.check_count(1).is_ok());
        assert!(config.check_count(50).is_ok());
        assert!(config.check_count(0).is_err());
        assert!(config.check_count(51).is_err());
    }

    #[test]
    fn explicit_missing_config_fails() {
        let err = load_config_from(Some(Path::new("no/such/mockexam.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_config_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "max_questions = 12\none_per_topic = true\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.max_questions, 12);
        assert!(config.one_per_topic);
    }
}
