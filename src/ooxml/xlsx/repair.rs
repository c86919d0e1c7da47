//! External repair step run by `save` after a package with conditional
//! formatting has been written.
//!
//! Some readers reject conditional formatting written by hand-assembled
//! packages until the file has been re-encoded by a full office suite. The
//! repair converts the file into a side directory and moves the result back
//! over the original path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::ooxml::error::{Result, XlsxError};

/// Default conversion program.
pub const DEFAULT_PROGRAM: &str = "libreoffice";
/// Directory, next to the saved file, that receives the converted copy.
pub const OUTPUT_DIR_NAME: &str = "repaired_xlsx";
/// Filter argument for the conversion.
const CONVERT_TO: &str = "xlsx:Calc MS Excel 2007 XML";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Re-encodes a written package in place.
pub trait DocumentRepairer {
    /// Repair the package at `path`, replacing it on success.
    fn repair(&self, path: &Path) -> Result<()>;
}

/// Repairer that leaves the file untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepair;

impl DocumentRepairer for NoRepair {
    fn repair(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Repairs a package by round-tripping it through LibreOffice in headless mode.
#[derive(Debug, Clone)]
pub struct LibreOfficeRepairer {
    program: OsString,
    timeout: Option<Duration>,
}

impl Default for LibreOfficeRepairer {
    fn default() -> Self {
        Self {
            program: OsString::from(DEFAULT_PROGRAM),
            timeout: None,
        }
    }
}

impl LibreOfficeRepairer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another executable name or path.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill the conversion if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Locate the program, either as given or on `PATH`.
    fn resolve_program(&self) -> Result<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return if program.is_file() {
                Ok(program.to_path_buf())
            } else {
                Err(self.unavailable())
            };
        }

        let paths = std::env::var_os("PATH").ok_or_else(|| self.unavailable())?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| self.unavailable())
    }

    fn unavailable(&self) -> XlsxError {
        XlsxError::ToolUnavailable(self.program.to_string_lossy().into_owned())
    }

    fn run(&self, program: &Path, file: &Path, outdir: &Path) -> Result<()> {
        let mut child = Command::new(program)
            .arg("--headless")
            .arg("--convert-to")
            .arg(CONVERT_TO)
            .arg(file)
            .arg("--outdir")
            .arg(outdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| XlsxError::RepairFailed(format!("failed to start {}: {}", program.display(), e)))?;

        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {},
                Err(e) => {
                    stop(&mut child);
                    return Err(XlsxError::RepairFailed(format!(
                        "lost track of {}: {}",
                        program.display(),
                        e
                    )));
                },
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                stop(&mut child);
                return Err(XlsxError::RepairFailed(format!(
                    "{} did not finish within {:?}",
                    program.display(),
                    self.timeout.unwrap_or_default()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };

        if !status.success() {
            return Err(XlsxError::RepairFailed(format!(
                "{} exited with {}",
                program.display(),
                status
            )));
        }
        Ok(())
    }
}

impl DocumentRepairer for LibreOfficeRepairer {
    fn repair(&self, path: &Path) -> Result<()> {
        let program = self.resolve_program()?;
        let file_name = path
            .file_name()
            .ok_or_else(|| XlsxError::RepairFailed(format!("{} has no file name", path.display())))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let outdir = parent.join(OUTPUT_DIR_NAME);
        std::fs::create_dir_all(&outdir).map_err(|e| {
            XlsxError::RepairFailed(format!("cannot create {}: {}", outdir.display(), e))
        })?;

        log::info!("repairing {} with {}", path.display(), program.display());
        self.run(&program, path, &outdir)?;

        let repaired = outdir.join(file_name);
        if !repaired.is_file() {
            return Err(XlsxError::RepairFailed(format!(
                "{} produced no {}",
                program.display(),
                repaired.display()
            )));
        }
        if let Err(e) = std::fs::rename(&repaired, path) {
            log::warn!("rename of {} failed ({}), copying instead", repaired.display(), e);
            std::fs::copy(&repaired, path)
                .and_then(|_| std::fs::remove_file(&repaired))
                .map_err(|e| XlsxError::RepairFailed(format!("cannot replace {}: {}", path.display(), e)))?;
        }
        Ok(())
    }
}

/// Kill a conversion that is abandoned and reap it.
fn stop(child: &mut Child) {
    // The child may exit between the last poll and kill
    let _ = child.kill();
    let _ = child.wait();
}
