//! Route planning.
//!
//! Turns sitemap entries into render targets: filters versioned docs
//! routes to the current version, derives each route's output directory,
//! and makes sure the directory tree exists before any rendering starts.

use crate::config::SiteConfig;
use crate::sitemap::Sitemap;
use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Documentation subtree whose routes are version-gated.
const DOCS_PREFIX: &str = "/documentation/";

/// One route to prerender, with its resolved output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Site-relative route path, always with a leading `/`.
    pub route: String,
    /// Directory the rendered `index.html` is written into.
    pub output_dir: PathBuf,
}

/// Build the render plan from the sitemap, preserving sitemap order.
///
/// Creates each route's output directory (idempotent; safe when the
/// directory already exists). A directory-creation failure or an invalid
/// `loc` aborts planning.
pub fn plan_routes(sitemap: &Sitemap, config: &SiteConfig) -> Result<Vec<RouteDescriptor>> {
    let mut routes = Vec::with_capacity(sitemap.entries.len());

    for entry in &sitemap.entries {
        if !is_current_version(&entry.loc, &config.site.version) {
            continue;
        }

        let route = route_from_loc(&entry.loc, &config.site.path_prefix)
            .with_context(|| format!("invalid sitemap entry: {}", entry.loc))?;
        let output_dir = config.build.browser.join(route.trim_start_matches('/'));

        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;

        routes.push(RouteDescriptor { route, output_dir });
    }

    Ok(routes)
}

/// An entry under the versioned docs subtree is kept only for the current
/// version; everything outside that subtree is always kept.
fn is_current_version(loc: &str, version: &str) -> bool {
    if !loc.contains(DOCS_PREFIX) {
        return true;
    }
    loc.contains(&format!("{DOCS_PREFIX}{version}"))
}

/// Derive the site-relative route path from a sitemap `loc`.
///
/// Takes the percent-decoded URL path and strips the hosting prefix.
fn route_from_loc(loc: &str, path_prefix: &str) -> Result<String> {
    let url = Url::parse(loc)?;
    let decoded = percent_decode_str(url.path())
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| url.path().to_string());

    let path = if path_prefix.is_empty() {
        decoded
    } else {
        let prefix = format!("/{}/", path_prefix.trim_matches('/'));
        match decoded.strip_prefix(&prefix) {
            Some(rest) => format!("/{rest}"),
            None => decoded,
        }
    };

    if path.starts_with('/') {
        Ok(path)
    } else {
        Ok(format!("/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::SitemapEntry;

    fn entry(loc: &str) -> SitemapEntry {
        SitemapEntry {
            loc: loc.to_string(),
            lastmod: None,
        }
    }

    fn test_config(browser: &std::path::Path, version: &str, path_prefix: &str) -> SiteConfig {
        let mut config = SiteConfig::parse("").unwrap();
        config.site.version = version.to_string();
        config.site.path_prefix = path_prefix.to_string();
        config.build.browser = browser.to_path_buf();
        config
    }

    #[test]
    fn test_other_version_docs_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path(), "v2", "");
        let sitemap = Sitemap {
            entries: vec![
                entry("https://clarity.design/documentation/v2/x"),
                entry("https://clarity.design/documentation/v1/y"),
                entry("https://clarity.design/icons"),
            ],
        };

        let routes = plan_routes(&sitemap, &config).unwrap();

        let paths: Vec<_> = routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(paths, ["/documentation/v2/x", "/icons"]);
    }

    #[test]
    fn test_plan_preserves_sitemap_order() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path(), "v2", "");
        let sitemap = Sitemap {
            entries: vec![
                entry("https://clarity.design/news"),
                entry("https://clarity.design/"),
                entry("https://clarity.design/community"),
            ],
        };

        let routes = plan_routes(&sitemap, &config).unwrap();

        let paths: Vec<_> = routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(paths, ["/news", "/", "/community"]);
    }

    #[test]
    fn test_path_prefix_stripped() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path(), "v2", "clarity/");
        let sitemap = Sitemap {
            entries: vec![entry("https://vmware.github.io/clarity/icons")],
        };

        let routes = plan_routes(&sitemap, &config).unwrap();

        assert_eq!(routes[0].route, "/icons");
        assert_eq!(routes[0].output_dir, tmp.path().join("icons"));
    }

    #[test]
    fn test_route_percent_decoded() {
        let route = route_from_loc("https://example.com/docs/a%20b", "").unwrap();
        assert_eq!(route, "/docs/a b");
    }

    #[test]
    fn test_root_route() {
        let route = route_from_loc("https://clarity.design/", "").unwrap();
        assert_eq!(route, "/");
    }

    #[test]
    fn test_invalid_loc_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path(), "v2", "");
        let sitemap = Sitemap {
            entries: vec![entry("not a url")],
        };

        assert!(plan_routes(&sitemap, &config).is_err());
    }

    #[test]
    fn test_output_directories_created_idempotently() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path(), "v2", "");
        let sitemap = Sitemap {
            entries: vec![entry("https://clarity.design/documentation/v2/alerts")],
        };

        let routes = plan_routes(&sitemap, &config).unwrap();
        assert!(routes[0].output_dir.is_dir());

        // Planning again over existing directories must not error
        let routes = plan_routes(&sitemap, &config).unwrap();
        assert!(routes[0].output_dir.is_dir());
    }

    #[test]
    fn test_version_filter_on_plain_strings() {
        assert!(is_current_version("https://x/documentation/v2/a", "v2"));
        assert!(!is_current_version("https://x/documentation/v1/a", "v2"));
        assert!(is_current_version("https://x/icons", "v2"));
        assert!(is_current_version("https://x/", "v2"));
    }
}
