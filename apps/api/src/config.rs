use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_SCORER_TIMEOUT_SECS: u64 = 120;
const DEFAULT_EXTRACTOR_TIMEOUT_SECS: u64 = 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub scorer: ProcessConfig,
    pub extractor: ProcessConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            scorer: ProcessConfig::from_env("SCORER", DEFAULT_SCORER_TIMEOUT_SECS)?,
            extractor: ProcessConfig::from_env("EXTRACTOR", DEFAULT_EXTRACTOR_TIMEOUT_SECS)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// How to launch one external engine (scorer or text extractor).
///
/// The request payload is always appended as the final argument, after the
/// optional script path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub program: PathBuf,
    pub script: Option<PathBuf>,
    /// `None` waits for the process indefinitely.
    pub timeout: Option<Duration>,
}

impl ProcessConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            script: None,
            timeout: None,
        }
    }

    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `{prefix}_PROGRAM`, `{prefix}_SCRIPT` and `{prefix}_TIMEOUT_SECS`.
    fn from_env(prefix: &str, default_timeout_secs: u64) -> Result<Self> {
        let program = require_env(&format!("{prefix}_PROGRAM"))?;
        let script = std::env::var(format!("{prefix}_SCRIPT"))
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        let timeout_secs = match std::env::var(format!("{prefix}_TIMEOUT_SECS")) {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("{prefix}_TIMEOUT_SECS must be a whole number of seconds"))?,
            Err(_) => default_timeout_secs,
        };

        Ok(ProcessConfig {
            program: PathBuf::from(program),
            script,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }

    /// Startup check: the program and script must exist before we accept traffic.
    pub fn verify(&self) -> Result<()> {
        if !program_exists(&self.program) {
            bail!(
                "Configured program '{}' does not exist or is not on PATH",
                self.program.display()
            );
        }
        if let Some(script) = &self.script {
            if !script.is_file() {
                bail!("Configured script '{}' does not exist", script.display());
            }
        }
        Ok(())
    }

    /// Argument list for one invocation: `[script?, payload]`.
    pub fn arguments(&self, payload: String) -> Vec<String> {
        let mut args = Vec::with_capacity(2);
        if let Some(script) = &self.script {
            args.push(script.display().to_string());
        }
        args.push(payload);
        args
    }
}

/// A program given with a path component must be a file; a bare name is
/// looked up on `PATH`.
fn program_exists(program: &Path) -> bool {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_verify_accepts_program_on_path() {
        assert!(ProcessConfig::new("sh").verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_missing_program() {
        let config = ProcessConfig::new("/definitely/not/here/python3");
        let err = config.verify().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_verify_rejects_unknown_bare_program() {
        assert!(ProcessConfig::new("kaam-no-such-binary-xyz").verify().is_err());
    }

    #[test]
    fn test_verify_checks_script_file() {
        let mut script = tempfile::NamedTempFile::new().unwrap();
        writeln!(script, "echo ok").unwrap();

        let present = ProcessConfig::new("sh").with_script(script.path());
        assert!(present.verify().is_ok());

        let missing = ProcessConfig::new("sh").with_script("/no/such/similarity.py");
        assert!(missing.verify().is_err());
    }

    #[test]
    fn test_arguments_put_payload_last() {
        let config = ProcessConfig::new("python3").with_script("model/similarity.py");
        assert_eq!(
            config.arguments("{}".to_string()),
            vec!["model/similarity.py".to_string(), "{}".to_string()]
        );
        assert_eq!(
            ProcessConfig::new("python3").arguments("https://x/y.pdf".to_string()),
            vec!["https://x/y.pdf".to_string()]
        );
    }
}
