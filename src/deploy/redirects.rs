//! Legacy redirect stubs.
//!
//! Old URLs stay alive through minimal meta-refresh pages, a static
//! fallback for hosts without server-side redirect support. The rules are
//! data (`redirects.toml`), not code.
//!
//! # Rule Format
//!
//! ```toml
//! [[redirect]]
//! from = "documentation/get-started"
//! to = "/documentation/{version}/get-started"
//! ```
//!
//! `{version}` expands to the configured docs version in either field. An
//! absolute `to` is used verbatim; a relative one is joined onto the
//! public base URL.

use crate::config::SiteConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One legacy path and its destination.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedirectRule {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Default, Deserialize)]
struct RedirectTable {
    #[serde(default)]
    redirect: Vec<RedirectRule>,
}

/// Load redirect rules from a TOML table file.
pub fn load_rules(path: &Path) -> Result<Vec<RedirectRule>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading redirect table {}", path.display()))?;
    let table: RedirectTable = toml::from_str(&content)
        .with_context(|| format!("parsing redirect table {}", path.display()))?;
    Ok(table.redirect)
}

/// Write one meta-refresh stub per rule into the build tree, creating
/// source directories as needed.
///
/// Rules later in the table overwrite earlier ones with the same source
/// (last write wins).
pub fn write_redirects(rules: &[RedirectRule], browser: &Path, config: &SiteConfig) -> Result<()> {
    for rule in rules {
        let source = expand(&rule.from, &config.site.version);
        let destination = destination_url(&rule.to, config);

        let dir = browser.join(source.trim_matches('/'));
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating redirect directory {}", dir.display()))?;
        fs::write(dir.join("index.html"), redirect_stub(&destination))
            .with_context(|| format!("writing redirect stub for `{}`", rule.from))?;
    }

    Ok(())
}

/// Resolve a rule destination to an absolute URL.
fn destination_url(to: &str, config: &SiteConfig) -> String {
    let to = expand(to, &config.site.version);
    if to.is_empty() {
        return config.base_url().to_string();
    }
    if to.starts_with("http://") || to.starts_with("https://") {
        return to;
    }
    format!("{}/{}", config.base_url(), to.trim_start_matches('/'))
}

/// Expand the `{version}` placeholder.
fn expand(value: &str, version: &str) -> String {
    value.replace("{version}", version)
}

/// The minimal client-side redirect document.
fn redirect_stub(destination: &str) -> String {
    format!(
        "<html><head><meta http-equiv=\"refresh\" content=\"0; URL='{destination}'\" /></head><body></body></html>"
    )
}
