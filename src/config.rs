/// `config.toml` loading.
///
/// The first `config.toml` found in the search path wins. Every section and
/// key is optional; anything missing, or a file that fails to parse, falls
/// back to the built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub gamepad: GamepadConfig,
    /// Directory holding `level01.txt`, `level02.txt`, ...
    pub levels_dir: PathBuf,
    pub start_lives: u32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        SpeedConfig { tick_rate_ms: 50 }
    }
}

/// Button names per action, resolved by the gamepad module.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub fire: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        GamepadConfig {
            jump: names(&["A"]),
            fire: names(&["B", "X"]),
            confirm: names(&["Start"]),
            cancel: names(&["Select"]),
        }
    }
}

// ── File schema ──

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    speed: SpeedConfig,
    general: GeneralSection,
    gamepad: GamepadConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GeneralSection {
    levels_dir: String,
    start_lives: u32,
    /// 0 means "seed from entropy".
    seed: u64,
}

impl Default for GeneralSection {
    fn default() -> Self {
        GeneralSection { levels_dir: "levels".into(), start_lives: 3, seed: 0 }
    }
}

// ── Loading ──

impl GameConfig {
    /// Search the executable dir, the CWD, then the XDG and system data
    /// dirs for `config.toml`.
    pub fn load() -> Self {
        let dirs = search_dirs();
        let file = dirs.iter()
            .map(|d| d.join("config.toml"))
            .find(|p| p.is_file())
            .map(|p| read_config(&p))
            .unwrap_or_default();
        Self::from_file(file, &dirs)
    }

    fn from_file(file: ConfigFile, dirs: &[PathBuf]) -> Self {
        let seed = Some(file.general.seed).filter(|&s| s != 0);

        GameConfig {
            speed: SpeedConfig { tick_rate_ms: file.speed.tick_rate_ms.max(1) },
            gamepad: file.gamepad,
            levels_dir: resolve_levels_dir(&file.general.levels_dir, dirs),
            start_lives: file.general.start_lives.max(1),
            seed,
        }
    }
}

/// A relative levels dir is looked up next to each search dir; if none has
/// it, the raw path is kept (and the loader falls back to built-in levels).
fn resolve_levels_dir(raw: &str, dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    dirs.iter()
        .map(|d| d.join(&path))
        .find(|p| p.is_dir())
        .unwrap_or(path)
}

fn search_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe().ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();
    let xdg = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share/superpeach"))
        .filter(|p| p.is_dir());
    let system = Some(PathBuf::from("/usr/share/superpeach")).filter(|p| p.is_dir());

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in [exe_dir, cwd, xdg, system].into_iter().flatten() {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

fn read_config(path: &Path) -> ConfigFile {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            log::info!("config: {}", path.display());
            parse_config(&text)
        }
        Err(e) => {
            log::warn!("could not read {}: {e}", path.display());
            ConfigFile::default()
        }
    }
}

fn parse_config(text: &str) -> ConfigFile {
    toml::from_str(text).unwrap_or_else(|e| {
        log::warn!("config.toml parse error, using defaults: {e}");
        ConfigFile::default()
    })
}
