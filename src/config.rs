//! Command line arguments and start-up configuration.
//!
//! Both demos share the same tiny CLI surface: an optional `--desktop`
//! ordinal picking the monitor the main window is created on. Everything
//! else (window size, title, swap interval, blending) is fixed per program
//! and passed in through [`WindowConfig`] and [`RendererSettings`].

use std::path::{Path, PathBuf};

use clap::Parser;

/// Command line flags accepted by every demo binary.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about)]
pub struct Args {
    /// the index of the desktop to create the main window on
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub desktop: i32,
}

/// Map the `--desktop` flag onto a monitor index.
///
/// Negative values and ordinals past the last connected monitor fall back
/// to a regular window on the default monitor.
pub fn select_monitor(flag: i32, monitor_count: usize) -> Option<usize> {
    usize::try_from(flag)
        .ok()
        .filter(|index| *index < monitor_count)
}

/// Window creation parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Wait for vertical blank when presenting (swap interval 1).
    pub vsync: bool,
    /// Raw `--desktop` ordinal, see [`select_monitor`].
    pub desktop: i32,
    pub assets: AssetRoot,
}

impl WindowConfig {
    pub fn new(title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            width,
            height,
            vsync: true,
            desktop: -1,
            assets: AssetRoot::discover(),
        }
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_args(mut self, args: &Args) -> Self {
        self.desktop = args.desktop;
        self
    }
}

/// Fixed-function state shared by every colour pipeline of a renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererSettings {
    /// SRC_ALPHA / ONE_MINUS_SRC_ALPHA blending for all colour draws.
    pub alpha_blending: bool,
}

/// Directory every relative asset path is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot(PathBuf);

impl AssetRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// `./assets` if the working directory has one, the crate's bundled
    /// `assets/` otherwise.
    pub fn discover() -> Self {
        let local = Path::new("./").join("assets");
        if local.is_dir() {
            return Self(local);
        }
        Self(Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.0.join(file_name)
    }
}
