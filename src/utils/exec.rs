//! External command execution utilities.
//!
//! Provides a Builder-based API for running commands with stdin piping and
//! captured output.

#![allow(dead_code)]
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::from_slice(&["node", "dist/server/render.js"])
//!     .arg("/documentation/v2/alerts")
//!     .cwd(root)
//!     .stdin(template.as_bytes().to_vec())
//!     .output()?;
//! ```

use std::{
    ffi::{OsStr, OsString},
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    stdin_data: Option<Vec<u8>>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["node", "dist/server/render.js"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Pipe data to the child's stdin.
    pub fn stdin(mut self, data: Vec<u8>) -> Self {
        self.stdin_data = Some(data);
        self
    }

    /// The command line as a display string (for error messages).
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Spawn the command, feed stdin, and collect captured output.
    ///
    /// Exit status is reported in the returned [`Output`], not as an error;
    /// only spawn and pipe failures error here.
    pub fn output(self) -> std::io::Result<Output> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(if self.stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn()?;

        if let Some(data) = self.stdin_data {
            // Scoped so the pipe closes and the child sees EOF
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(&data)?;
            }
        }

        child.wait_with_output()
    }
}
