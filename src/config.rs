use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Settings {
    /// Seconds between decay ticks.
    pub(crate) tick_secs: u64,
    /// Wall-clock seconds per virtual day of pet age. 60 keeps the
    /// original toy's compressed 1-day-per-minute scale; raise it for a
    /// slower-aging pet.
    pub(crate) day_secs: u64,
    /// How long an achievement notice stays on screen.
    pub(crate) notice_secs: u64,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_secs: 5,
            day_secs: 60,
            notice_secs: 3,
            fps_cap: 30,
            enable_color: true,
        }
    }
}

impl Settings {
    /// Zero intervals would stall or divide by zero downstream.
    pub(crate) fn sanitized(mut self) -> Self {
        self.tick_secs = self.tick_secs.max(1);
        self.day_secs = self.day_secs.max(1);
        self.notice_secs = self.notice_secs.max(1);
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self
    }
}

pub(crate) struct Paths {
    pub(crate) data_dir: PathBuf,
    pub(crate) settings_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "termpet", "Termpet")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).ok();
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        data_dir: dir,
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<Settings>(&s) {
            return v.sanitized();
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Best-effort atomic replace on same filesystem.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rejects_zero_intervals() {
        let s = Settings {
            tick_secs: 0,
            day_secs: 0,
            notice_secs: 0,
            fps_cap: 1000,
            enable_color: false,
        }
        .sanitized();
        assert_eq!(s.tick_secs, 1);
        assert_eq!(s.day_secs, 1);
        assert_eq!(s.notice_secs, 1);
        assert_eq!(s.fps_cap, 240);
    }
}
