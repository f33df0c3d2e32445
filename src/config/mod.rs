//! Site configuration management for `prerender.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                             |
//! |-------------|-----------------------------------------------------|
//! | `[site]`    | Public URL, current docs version, hosting prefix    |
//! | `[build]`   | Browser build tree, render template, sitemap paths  |
//! | `[render]`  | Render collaborator command                         |
//! | `[deploy]`  | Destination, base href, redirect table              |
//!
//! The config file is discovered by searching upward from the working
//! directory. CLI flags override file values; all relative paths are
//! resolved against the project root (the config file's directory) once at
//! load time, so every component downstream works with absolute paths.

mod error;

pub use error::ConfigError;

use crate::{cli::Cli, utils::path::resolve_path};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing prerender.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site identity (public URL, docs version, hosting prefix)
    pub site: SiteSection,

    /// Build inputs (browser tree, template, sitemap)
    pub build: BuildSection,

    /// Render collaborator invocation
    pub render: RenderSection,

    /// Deployment settings
    pub deploy: DeploySection,
}

/// `[site]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    /// Public base URL of the published site.
    pub url: String,

    /// Current documentation version; routes under `/documentation/` for
    /// any other version are skipped.
    pub version: String,

    /// Path prefix the site is hosted under, stripped from sitemap URL
    /// paths when mapping routes onto the filesystem (e.g. `clarity/`).
    pub path_prefix: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: "https://clarity.design".to_string(),
            version: String::new(),
            path_prefix: String::new(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Pre-built browser bundle; also the root rendered pages are written
    /// under.
    pub browser: PathBuf,

    /// HTML document used as the render shell.
    pub template: PathBuf,

    /// Sitemap enumerating the routes to prerender.
    pub sitemap: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            browser: PathBuf::from("browser"),
            template: PathBuf::from("browser/index.html"),
            sitemap: PathBuf::from("browser/sitemap.xml"),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Render collaborator command. The route path is appended as the final
    /// argument; the template document is piped to stdin.
    pub command: Vec<String>,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            command: vec!["node".to_string(), "dist/server/render.js".to_string()],
        }
    }
}

/// `[deploy]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeploySection {
    /// Whether the deploy step runs (set from the --deploy flag).
    #[serde(skip)]
    pub enable: bool,

    /// Deploy destination directory.
    pub directory: PathBuf,

    /// Base href written into built assets in place of the root marker.
    pub base_href: String,

    /// Redirect rule table.
    pub redirects: PathBuf,
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            enable: false,
            directory: PathBuf::from("../../clarity"),
            base_href: "/clarity/".to_string(),
            redirects: PathBuf::from("redirects.toml"),
        }
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root
    /// is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = Self::resolve_config_path(&cli.config)?;

        let mut config = Self::from_path(&config_path)
            .with_context(|| format!("loading config from {}", config_path.display()))?;

        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;
        config.finalize(cli);
        config.validate()?;

        Ok(config)
    }

    /// Read and parse a config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::parse(&content)
    }

    /// Parse config file content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the config file path, searching upward for relative paths.
    fn resolve_config_path(config: &Path) -> Result<PathBuf> {
        if config.is_absolute() {
            if config.is_file() {
                return Ok(config.to_path_buf());
            }
            bail!("Config file '{}' not found", config.display());
        }

        match find_config_file(config) {
            Some(path) => Ok(path),
            None => bail!(
                "Config file '{}' not found in the current directory or any parent",
                config.display()
            ),
        }
    }

    /// Finalize configuration after loading: apply CLI overrides, expand
    /// tildes, resolve paths against the project root.
    fn finalize(&mut self, cli: &Cli) {
        self.deploy.enable = cli.deploy;
        if let Some(base) = &cli.base {
            self.site.url = base.clone();
        }
        if let Some(directory) = &cli.directory {
            self.deploy.directory = directory.clone();
        }

        self.deploy.directory = expand_tilde(&self.deploy.directory);

        self.build.browser = resolve_path(&self.build.browser, &self.root);
        self.build.template = resolve_path(&self.build.template, &self.root);
        self.build.sitemap = resolve_path(&self.build.sitemap, &self.root);
        self.deploy.directory = resolve_path(&self.deploy.directory, &self.root);
        self.deploy.redirects = resolve_path(&self.deploy.redirects, &self.root);
    }

    /// Validate the finalized configuration.
    ///
    /// A broken configuration is fatal before any rendering starts.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.version must be set to the current documentation version".to_string(),
            ));
        }
        if self.site.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.url must be a non-empty URL".to_string(),
            ));
        }
        if self.render.command.is_empty() {
            return Err(ConfigError::Validation(
                "render.command must name the render command".to_string(),
            ));
        }
        if !self.build.browser.is_dir() {
            return Err(ConfigError::Validation(format!(
                "build.browser directory not found: {}",
                self.build.browser.display()
            )));
        }
        if !self.build.template.is_file() {
            return Err(ConfigError::Validation(format!(
                "build.template file not found: {}",
                self.build.template.display()
            )));
        }
        if !self.build.sitemap.is_file() {
            return Err(ConfigError::Validation(format!(
                "build.sitemap file not found: {}",
                self.build.sitemap.display()
            )));
        }
        if self.deploy.enable && !self.deploy.redirects.is_file() {
            return Err(ConfigError::Validation(format!(
                "deploy.redirects file not found: {}",
                self.deploy.redirects.display()
            )));
        }
        Ok(())
    }

    /// Public base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.site.url.trim_end_matches('/')
    }
}

/// Search upward from the current directory for the config file.
fn find_config_file(name: &Path) -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Expand a leading tilde in a user-supplied path.
fn expand_tilde(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}
