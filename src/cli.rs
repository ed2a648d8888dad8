use crate::config::{LoggerPolicy, ManagerConfig};
use crate::logging::LogLevel;
use crate::resource::{
    locate_root_from_cwd, FileType, Handle, ResourceManager, ResourceType, StringLoader,
};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// Marker file searched for when neither a root nor a config is given
pub const DEFAULT_MARKER: &str = ".rmsroot";

/// Resource manager shell - loads text resources and prints them
#[derive(Parser, Debug, Default)]
#[command(name = "rms")]
#[command(version)]
#[command(about = "Load text resources through a resource manager", long_about = None)]
pub struct Cli {
    /// Resource root directory
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Property file with root, namespace and logger settings
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Marker file used to locate the root from the working directory
    #[arg(short, long, value_name = "FILE")]
    pub marker: Option<String>,

    /// Standard namespace
    #[arg(short, long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Directory of the text resources inside each namespace
    #[arg(short, long, value_name = "DIR", default_value = "content")]
    pub directory: String,

    /// File extension of the text resources
    #[arg(short, long, value_name = "EXT", default_value = "txt")]
    pub extension: String,

    /// Value shown for resources that fail to load
    #[arg(short, long, value_name = "TEXT", default_value = "FAILED")]
    pub fallback: String,

    /// Dispose, switch to this root and print everything again
    #[arg(long = "reload-root", value_name = "DIR")]
    pub reload_root: Option<PathBuf>,

    /// Do not report load failures
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Resources to load, as NAME or NAMESPACE:NAME
    #[arg(value_name = "RESOURCE", required = true)]
    pub resources: Vec<String>,
}

/// Whole-file text resource with a configurable extension and fallback
#[derive(Debug, Clone)]
pub struct PlainText {
    extension: String,
    fallback: String,
}

impl PlainText {
    pub fn new(extension: &str, fallback: &str) -> Self {
        Self {
            extension: extension.to_string(),
            fallback: fallback.to_string(),
        }
    }
}

impl StringLoader for PlainText {
    type Resource = String;

    fn extension(&self) -> &str {
        &self.extension
    }

    fn load(&self, _: &ResourceManager, _: &str, _: &str, text: String) -> Result<String> {
        Ok(text)
    }

    fn create_fallback(&self, _: &ResourceManager, _: &str, _: &str) -> Option<String> {
        Some(self.fallback.clone())
    }

    fn type_name(&self) -> &str {
        "text"
    }
}

impl Cli {
    /// Log level from `-v` occurrences; warnings by default
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_i32(LogLevel::Warning.as_i32() + i32::from(self.verbose))
    }

    /// Merge CLI arguments over the config file, if any
    pub fn manager_config(&self) -> Result<ManagerConfig> {
        let mut config = match (&self.config, &self.root) {
            (Some(path), _) => ManagerConfig::from_propfile(path)?,
            (None, Some(root)) => ManagerConfig::new(root.clone()),
            (None, None) => {
                let marker = self.marker.as_deref().unwrap_or(DEFAULT_MARKER);
                let root = locate_root_from_cwd(marker)
                    .with_context(|| format!("No --root given and no '{}' marker found", marker))?;
                ManagerConfig::new(root)
            }
        };

        if let Some(ref root) = self.root {
            config.root = root.clone();
        }
        if let Some(ref namespace) = self.namespace {
            if namespace.is_empty() {
                anyhow::bail!("Namespace must not be empty");
            }
            config.standard_namespace = namespace.clone();
        }
        if self.quiet {
            config.logger = LoggerPolicy::Silent;
        }

        Ok(config)
    }

    /// Load every requested resource, print it, and optionally reload.
    pub fn run(&self, out: &mut dyn Write) -> Result<()> {
        let config = self.manager_config()?;
        let manager = ResourceManager::from_config(&config);
        log::debug!("Using {:?}", manager);

        let text = Rc::new(FileType::string(PlainText::new(&self.extension, &self.fallback)));
        manager.register(&text, &self.directory)?;

        let handles = self
            .resources
            .iter()
            .map(|resource| {
                let (namespace, name) = split_resource(resource)?;
                manager
                    .handle(&text, namespace, name)
                    .with_context(|| format!("Invalid resource '{}'", resource))
            })
            .collect::<Result<Vec<_>>>()?;

        print_handles(out, &handles)?;

        if let Some(ref reload_root) = self.reload_root {
            manager.dispose_with_root(reload_root)?;
            writeln!(out, "-- reloaded from {}", reload_root.display())?;
            print_handles(out, &handles)?;
        }

        manager.dispose();
        Ok(())
    }
}

/// Split `namespace:name`; a bare name uses the standard namespace.
fn split_resource(resource: &str) -> Result<(Option<&str>, &str)> {
    match resource.split_once(':') {
        Some(("", _)) => anyhow::bail!("Invalid resource '{}': namespace must not be empty", resource),
        Some((namespace, name)) => Ok((Some(namespace), name)),
        None => Ok((None, resource)),
    }
}

fn print_handles<T>(out: &mut dyn Write, handles: &[Handle<T>]) -> Result<()>
where
    T: ResourceType<Resource = String>,
{
    for handle in handles {
        let value = handle.get().map(|text| text.trim_end().to_string()).unwrap_or_default();
        writeln!(out, "{}:{} = {}", handle.namespace(), handle.name(), value)?;
    }
    Ok(())
}
