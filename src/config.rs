use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::resource::{ConsoleLogger, ResourceLogger, ResourceManager, SilentLogger};

/// Namespace used when a config file names none.
pub const DEFAULT_NAMESPACE: &str = "std";

/// Where the manager's diagnostics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerPolicy {
    #[default]
    Console,
    Silent,
}

impl LoggerPolicy {
    fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "log" => Ok(LoggerPolicy::Console),
            "silent" | "none" | "off" => Ok(LoggerPolicy::Silent),
            _ => anyhow::bail!("Invalid logger policy: {}. Valid options: console, silent", s),
        }
    }

    /// The sink this policy installs, `None` meaning silence.
    pub fn sink(self) -> Option<Rc<dyn ResourceLogger>> {
        match self {
            LoggerPolicy::Console => Some(Rc::new(ConsoleLogger)),
            LoggerPolicy::Silent => None,
        }
    }
}

/// Settings needed to build a [`ResourceManager`]
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub root: PathBuf,
    pub standard_namespace: String,
    pub logger: LoggerPolicy,
}

impl ManagerConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            standard_namespace: DEFAULT_NAMESPACE.to_string(),
            logger: LoggerPolicy::default(),
        }
    }

    /// Load settings from a property file.
    ///
    /// A relative `root` is taken relative to the directory holding the file.
    pub fn from_propfile<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::parse(&data)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if config.root.is_relative() {
            if let Some(base) = path.parent() {
                config.root = base.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Parse settings from property file text.
    ///
    /// Recognised keys are `root`, `namespace` and `logger`. Unknown keys are
    /// ignored with a warning.
    pub fn parse(data: &str) -> Result<Self> {
        let mut root = None;
        let mut namespace = None;
        let mut logger = None;

        for (key, value) in parse_properties(data) {
            match key.to_lowercase().as_str() {
                "root" => root = Some(value),
                "namespace" => namespace = Some(value),
                "logger" => logger = Some(LoggerPolicy::parse(&value)?),
                _ => log::warn!("Ignoring unknown config key '{}'", key),
            }
        }

        let root = root
            .filter(|root| !root.is_empty())
            .context("Config is missing 'root'")?;
        let standard_namespace = match namespace {
            Some(namespace) if namespace.is_empty() => anyhow::bail!("Config 'namespace' is empty"),
            Some(namespace) => namespace,
            None => DEFAULT_NAMESPACE.to_string(),
        };

        Ok(Self {
            root: PathBuf::from(root),
            standard_namespace,
            logger: logger.unwrap_or_default(),
        })
    }
}

impl ResourceManager {
    /// Build a manager from loaded settings.
    pub fn from_config(config: &ManagerConfig) -> Self {
        let manager = ResourceManager::new(config.root.clone(), config.standard_namespace.clone());
        manager.set_logger(config.logger.sink());
        manager
    }
}

/// Split `key = value` lines.
///
/// Whitespace around keys and values is trimmed, `#` starts a comment that
/// runs to the end of the line, and lines without `=` are skipped with a
/// warning. Key case is preserved.
fn parse_properties(data: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();

    for (number, line) in data.lines().enumerate() {
        let line = match line.find('#') {
            Some(hash) => &line[..hash],
            None => line,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                entries.push((key.trim().to_string(), value.trim().to_string()));
            }
            _ => log::warn!("Skipping malformed config line {}: '{}'", number + 1, line),
        }
    }

    entries
}
