use crate::optics::OpticalType;

use anyhow::Context;
use serde::Deserialize;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Copy, Clone, Debug)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

/// Startup configuration. Distances and sizes are in UI units; the panel
/// scales them into canvas units.
#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub resolution: Resolution,
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
    pub optical: OpticalType,
    pub object_image: Option<PathBuf>,
    pub object_distance: i32,
    pub focal_length: i32,
    pub object_size: i32,
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets")
}

pub fn get_config<P: AsRef<Path>>(filepath: P) -> anyhow::Result<Config> {
    let filepath = filepath.as_ref();
    info!("loading config at {}", filepath.display());
    let mut input = String::new();
    File::open(filepath)
        .and_then(|mut f| f.read_to_string(&mut input))
        .with_context(|| format!("failed to read config at {}", filepath.display()))?;
    let config: Config = toml::from_str(&input)
        .with_context(|| format!("malformed config at {}", filepath.display()))?;
    Ok(config)
}
