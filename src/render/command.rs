//! Render collaborator subprocess.
//!
//! The renderer is an opaque external program: it receives the route path
//! as its final argument and the template document on stdin, and writes
//! the rendered HTML document to stdout.

use super::{RenderError, Renderer};
use crate::config::SiteConfig;
use crate::utils::exec::Cmd;
use std::path::PathBuf;

/// Runs the configured render command once per route.
pub struct CommandRenderer {
    command: Vec<String>,
    cwd: PathBuf,
}

impl CommandRenderer {
    pub fn new(config: &SiteConfig) -> Self {
        Self::from_command(config.render.command.clone(), config.root.clone())
    }

    pub fn from_command(command: Vec<String>, cwd: PathBuf) -> Self {
        Self { command, cwd }
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, route: &str, template: &str) -> Result<String, RenderError> {
        let cmd = Cmd::from_slice(&self.command)
            .arg(route)
            .cwd(&self.cwd)
            .stdin(template.as_bytes().to_vec());
        let display = cmd.display();

        let output = cmd.output().map_err(|source| RenderError::Spawn {
            command: display,
            source,
        })?;

        if !output.status.success() {
            return Err(RenderError::Exited {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr)
                    .trim_end()
                    .to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
