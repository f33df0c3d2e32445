//! Page rendering.
//!
//! The render collaborator holds process-wide state that is unsafe for
//! concurrent invocation, so routes render strictly one at a time, in
//! plan order. A failed route is reported and skipped; it never stops
//! the run.

mod command;

pub use command::CommandRenderer;

use crate::log;
use crate::logger::{route_begin, route_fail, route_success};
use crate::plan::RouteDescriptor;
use anyhow::{Context, Result};
use std::fs;
use thiserror::Error;

/// Errors from the external render collaborator.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to run render command `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("render command exited with {status}: {stderr}")]
    Exited {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("render output is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// The narrow seam to the external renderer, stubbable in tests.
pub trait Renderer {
    /// Render one route into a full HTML document.
    fn render(&self, route: &str, template: &str) -> Result<String, RenderError>;
}

/// Outcome of a full render pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub failed: usize,
}

/// Render every planned route, one at a time, in plan order.
///
/// Returns only after all routes have been attempted. Per-route render
/// failures are reported and counted, never propagated; a failed route
/// leaves no output file.
pub fn render_routes<R: Renderer>(
    routes: &[RouteDescriptor],
    renderer: &R,
    template: &str,
) -> Result<RenderSummary> {
    let mut summary = RenderSummary::default();

    for route in routes {
        route_begin(&route.route);
        match renderer.render(&route.route, template) {
            Ok(html) => {
                write_page(route, &html)?;
                route_success(&route.route);
                summary.rendered += 1;
            }
            Err(e) => {
                route_fail(&route.route);
                log!("error"; "unable to render {}: {:#}", route.route, anyhow::Error::from(e));
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Write rendered HTML to the route's index.html, replacing any existing
/// file.
fn write_page(route: &RouteDescriptor, html: &str) -> Result<()> {
    let path = route.output_dir.join("index.html");
    fs::write(&path, html).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::plan::plan_routes;
    use crate::sitemap::{Sitemap, SitemapEntry};
    use std::io::Error;
    use std::sync::Mutex;

    /// Records invocation order; fails routes listed in `fail`.
    struct StubRenderer {
        fail: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubRenderer {
        fn new(fail: &[&str]) -> Self {
            Self {
                fail: fail.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Renderer for StubRenderer {
        fn render(&self, route: &str, template: &str) -> Result<String, RenderError> {
            self.calls.lock().unwrap().push(route.to_string());
            if self.fail.iter().any(|f| f == route) {
                return Err(RenderError::Spawn {
                    command: "stub".to_string(),
                    source: Error::other("stubbed failure"),
                });
            }
            Ok(template.replace("<!-- app -->", route))
        }
    }

    fn descriptors(tmp: &std::path::Path, routes: &[&str]) -> Vec<RouteDescriptor> {
        routes
            .iter()
            .map(|route| {
                let output_dir = tmp.join(route.trim_start_matches('/'));
                std::fs::create_dir_all(&output_dir).unwrap();
                RouteDescriptor {
                    route: route.to_string(),
                    output_dir,
                }
            })
            .collect()
    }

    #[test]
    fn test_renders_in_plan_order() {
        let tmp = tempfile::tempdir().unwrap();
        let routes = descriptors(tmp.path(), &["/news", "/icons", "/community"]);
        let renderer = StubRenderer::new(&[]);

        render_routes(&routes, &renderer, "<html></html>").unwrap();

        let calls = renderer.calls.lock().unwrap();
        assert_eq!(*calls, ["/news", "/icons", "/community"]);
    }

    #[test]
    fn test_success_writes_index_html() {
        let tmp = tempfile::tempdir().unwrap();
        let routes = descriptors(tmp.path(), &["/icons"]);
        let renderer = StubRenderer::new(&[]);

        let summary = render_routes(&routes, &renderer, "<html><!-- app --></html>").unwrap();

        assert_eq!(summary, RenderSummary {
            rendered: 1,
            failed: 0
        });
        let html = std::fs::read_to_string(tmp.path().join("icons/index.html")).unwrap();
        assert_eq!(html, "<html>/icons</html>");
    }

    #[test]
    fn test_failure_is_isolated() {
        let tmp = tempfile::tempdir().unwrap();
        let routes = descriptors(tmp.path(), &["/a", "/b", "/c"]);
        let renderer = StubRenderer::new(&["/b"]);

        let summary = render_routes(&routes, &renderer, "<html><!-- app --></html>").unwrap();

        assert_eq!(summary, RenderSummary {
            rendered: 2,
            failed: 1
        });
        // The failed route leaves no file; later routes still rendered
        assert!(tmp.path().join("a/index.html").is_file());
        assert!(!tmp.path().join("b/index.html").exists());
        assert!(tmp.path().join("c/index.html").is_file());

        let calls = renderer.calls.lock().unwrap();
        assert_eq!(*calls, ["/a", "/b", "/c"]);
    }

    #[test]
    fn test_overwrites_existing_page() {
        let tmp = tempfile::tempdir().unwrap();
        let routes = descriptors(tmp.path(), &["/icons"]);
        std::fs::write(tmp.path().join("icons/index.html"), "stale").unwrap();
        let renderer = StubRenderer::new(&[]);

        render_routes(&routes, &renderer, "<html><!-- app --></html>").unwrap();

        let html = std::fs::read_to_string(tmp.path().join("icons/index.html")).unwrap();
        assert_eq!(html, "<html>/icons</html>");
    }

    #[test]
    fn test_plan_and_render_only_current_version() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::parse("").unwrap();
        config.site.version = "v2".to_string();
        config.build.browser = tmp.path().to_path_buf();
        let sitemap = Sitemap {
            entries: vec![
                SitemapEntry {
                    loc: "https://clarity.design/documentation/v2/x".to_string(),
                    lastmod: None,
                },
                SitemapEntry {
                    loc: "https://clarity.design/documentation/v1/y".to_string(),
                    lastmod: None,
                },
            ],
        };

        let routes = plan_routes(&sitemap, &config).unwrap();
        let renderer = StubRenderer::new(&[]);
        render_routes(&routes, &renderer, "<html><!-- app --></html>").unwrap();

        assert!(
            tmp.path()
                .join("documentation/v2/x/index.html")
                .is_file()
        );
        assert!(
            !tmp.path()
                .join("documentation/v1/y/index.html")
                .exists()
        );
    }
}
