use super::defaults::{EMUBIN_DIR_NAME, MAX_FRAME_DIM, MAX_POLL_MS, MIN_POLL_MS};
use super::AppConfig;
use crate::capture::FrameSize;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(1..=MAX_FRAME_DIM).contains(&self.width) {
            bail!(
                "--width must be between 1 and {MAX_FRAME_DIM}, got {}",
                self.width
            );
        }
        if !(1..=MAX_FRAME_DIM).contains(&self.height) {
            bail!(
                "--height must be between 1 and {MAX_FRAME_DIM}, got {}",
                self.height
            );
        }
        if !(MIN_POLL_MS..=MAX_POLL_MS).contains(&self.poll_ms) {
            bail!(
                "--poll-ms must be between {MIN_POLL_MS} and {MAX_POLL_MS}, got {}",
                self.poll_ms
            );
        }

        let (program, args) = split_launcher(&self.launcher);
        if program.is_empty() {
            bail!("--launcher must name a program");
        }
        if program.contains('\0') || args.iter().any(|arg| arg.contains('\0')) {
            bail!("--launcher contains a NUL byte");
        }

        if let Some(dir) = self.emubin.take() {
            self.emubin = Some(absolutize(&dir).context("failed to resolve --emubin")?);
        }
        Ok(())
    }

    /// Launcher program and its leading arguments (the window id is appended at spawn time).
    pub fn launch_command(&self) -> (String, Vec<String>) {
        split_launcher(&self.launcher)
    }

    /// Directory prepended to the child's search paths.
    pub fn emubin_dir(&self) -> PathBuf {
        if let Some(dir) = &self.emubin {
            return dir.clone();
        }
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(EMUBIN_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(EMUBIN_DIR_NAME))
    }

    pub fn frame_size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    /// Control panel and signal relay are on unless `--no-controls` is given.
    pub fn controls_enabled(&self) -> bool {
        !self.no_controls
    }

    pub fn clock_enabled(&self) -> bool {
        !self.no_clock
    }
}

pub(super) fn split_launcher(raw: &str) -> (String, Vec<String>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (String::new(), Vec::new());
    }
    let parts = shell_words::split(trimmed)
        .unwrap_or_else(|_| trimmed.split_whitespace().map(|s| s.to_string()).collect());
    let mut parts = parts.into_iter();
    match parts.next() {
        Some(program) => (program, parts.collect()),
        None => (String::new(), Vec::new()),
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}
