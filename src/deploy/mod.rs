//! Deploy pipeline.
//!
//! Five sub-steps run strictly sequentially, each completing before the
//! next begins; any failure aborts the remainder with no rollback:
//!
//! 1. **Clean** - clear the destination, preserving docs and `.git`
//! 2. **Rewrite** - point the base href at the public base path
//! 3. **Not-found** - promote the rendered not-found page to `404.html`
//! 4. **Redirects** - write legacy meta-refresh stubs
//! 5. **Copy** - copy the processed build tree into the destination

mod redirects;

use crate::config::SiteConfig;
use crate::sitemap::Sitemap;
use crate::utils::path::copy_dir_recursively;
use crate::utils::plural_count;
use crate::{debug, log};
use redirects::{load_rules, write_redirects};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Route whose rendered output becomes the 404 fallback.
const NOT_FOUND_ROUTE: &str = "/not-found";

/// Marker written by the application build, replaced at deploy time.
const BASE_HREF_MARKER: &str = r#"<base href="/">"#;

/// Top-level destination entries the clean step preserves.
const PRESERVED: &[&str] = &["documentation", ".git"];

/// Run the whole deploy pipeline.
pub fn deploy_site(config: &SiteConfig) -> Result<()> {
    let browser = &config.build.browser;
    let destination = &config.deploy.directory;

    clean_destination(destination)?;
    log!("deploy"; "cleared old build");

    rewrite_base_href(browser, &config.deploy.base_href)?;
    log!("deploy"; "updated base href");

    promote_not_found(browser, &config.build.sitemap)?;
    log!("deploy"; "generated 404 page");

    let rules = load_rules(&config.deploy.redirects)?;
    write_redirects(&rules, browser, config)?;
    log!("deploy"; "generated {}", plural_count(rules.len(), "redirect stub"));

    copy_dir_recursively(browser, destination)?;
    log!("deploy"; "output copied to {}", destination.display());

    Ok(())
}

/// Remove every top-level destination entry except the documentation
/// subtree and version-control metadata, so historical doc versions
/// survive a redeploy. Creates the destination when absent.
fn clean_destination(destination: &Path) -> Result<()> {
    if !destination.exists() {
        return fs::create_dir_all(destination)
            .with_context(|| format!("creating deploy destination {}", destination.display()));
    }

    for entry in fs::read_dir(destination)
        .with_context(|| format!("reading deploy destination {}", destination.display()))?
    {
        let entry = entry.context("invalid directory entry")?;
        let name = entry.file_name();
        if PRESERVED.iter().any(|p| name == OsStr::new(p)) {
            continue;
        }

        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("removing {}", path.display()))?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("removing {}", path.display()))?;
        }
    }

    Ok(())
}

/// Replace the root base-href marker with the configured public base path
/// in every UTF-8 file of the build tree.
fn rewrite_base_href(browser: &Path, base_href: &str) -> Result<()> {
    let marker = Regex::new(&regex::escape(BASE_HREF_MARKER))
        .context("compiling base href pattern")?;
    let replacement = format!(r#"<base href="{base_href}">"#);

    let files: Vec<PathBuf> = jwalk::WalkDir::new(browser)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();

    files.par_iter().try_for_each(|path| -> Result<()> {
        // Binary assets are skipped; the marker only occurs in text files
        let Ok(content) = fs::read_to_string(path) else {
            return Ok(());
        };
        if !marker.is_match(&content) {
            return Ok(());
        }

        let rewritten = marker.replace_all(&content, regex::NoExpand(&replacement));
        fs::write(path, rewritten.as_ref())
            .with_context(|| format!("rewriting base href in {}", path.display()))?;
        debug!("deploy"; "base href updated: {}", path.display());
        Ok(())
    })
}

/// Promote the rendered not-found page to the site's 404 fallback:
/// copy it to `404.html`, drop its sitemap entry, delete its directory.
///
/// The route must exist exactly once; a missing rendered page, or a
/// sitemap with zero or multiple matching entries, is an error.
fn promote_not_found(browser: &Path, sitemap_path: &Path) -> Result<()> {
    let not_found_dir = browser.join(NOT_FOUND_ROUTE.trim_start_matches('/'));
    let source = not_found_dir.join("index.html");
    if !source.is_file() {
        bail!("rendered not-found page missing: {}", source.display());
    }

    fs::copy(&source, browser.join("404.html"))
        .with_context(|| format!("copying {} to 404.html", source.display()))?;

    let mut sitemap = Sitemap::load(sitemap_path)?;
    let matches = sitemap
        .entries
        .iter()
        .filter(|e| e.loc.contains(NOT_FOUND_ROUTE))
        .count();
    if matches != 1 {
        bail!("expected exactly one {NOT_FOUND_ROUTE} sitemap entry, found {matches}");
    }
    sitemap.retain(|e| !e.loc.contains(NOT_FOUND_ROUTE));
    sitemap.write(sitemap_path)?;

    fs::remove_dir_all(&not_found_dir)
        .with_context(|| format!("removing {}", not_found_dir.display()))?;

    Ok(())
}
