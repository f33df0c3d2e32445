//! Prerender - static prerenderer and deployer for the documentation website.

mod cli;
mod config;
mod deploy;
mod logger;
mod plan;
mod render;
mod sitemap;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::SiteConfig;
use plan::plan_routes;
use render::{CommandRenderer, render_routes};
use sitemap::Sitemap;
use std::fs;
use utils::plural_count;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(cli)?;
    run(&config)
}

/// Render every planned route, then optionally deploy.
fn run(config: &SiteConfig) -> Result<()> {
    let template = fs::read_to_string(&config.build.template)
        .with_context(|| format!("reading template {}", config.build.template.display()))?;
    let sitemap = Sitemap::load(&config.build.sitemap)?;

    let routes = plan_routes(&sitemap, config)?;
    log!("plan"; "{} to render", plural_count(routes.len(), "route"));

    let renderer = CommandRenderer::new(config);
    let summary = render_routes(&routes, &renderer, &template)?;
    if summary.failed > 0 {
        log!("render"; "{} rendered, {} failed", summary.rendered, summary.failed);
    } else {
        log!("render"; "{} rendered", plural_count(summary.rendered, "route"));
    }

    if config.deploy.enable {
        deploy::deploy_site(config)?;
    }

    log!("prerender"; "complete");
    Ok(())
}
