//! Runtime settings read from the environment, falling back to constants.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;

use crate::controller::DEFAULT_ZOOM;
use crate::db::DB_FILE_NAME;
use crate::models::Coordinates;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".workout-mapper";
/// Local storage key the workout list is kept under.
const DEFAULT_STORAGE_KEY: &str = "workouts";
const LOG_FILE_NAME: &str = "workout-mapper.log";

const DATA_DIR_VAR: &str = "WORKOUT_MAPPER_DATA_DIR";
const HOME_VAR: &str = "WORKOUT_MAPPER_HOME";
const ZOOM_VAR: &str = "WORKOUT_MAPPER_ZOOM";
const STORAGE_KEY_VAR: &str = "WORKOUT_MAPPER_STORAGE_KEY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Position reported by the geolocation provider. `None` leaves the app
    /// without a map.
    pub home: Option<Coordinates>,
    pub zoom: u8,
    pub storage_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup(DATA_DIR_VAR) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let home = lookup(HOME_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_coordinates(&raw).with_context(|| format!("invalid {HOME_VAR}")))
            .transpose()?;

        let zoom = match lookup(ZOOM_VAR) {
            Some(raw) => {
                let zoom: u8 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{ZOOM_VAR} must be a whole number"))?;
                if !(1..=19).contains(&zoom) {
                    bail!("{ZOOM_VAR} must be between 1 and 19, got {zoom}");
                }
                zoom
            }
            None => DEFAULT_ZOOM,
        };

        let storage_key = lookup(STORAGE_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            data_dir,
            home,
            zoom,
            storage_key,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Parse `"lat,lng"` in degrees.
fn parse_coordinates(raw: &str) -> Result<Coordinates> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("expected \"lat,lng\", got {raw:?}"))?;
    let lat: f64 = lat.trim().parse().context("latitude is not a number")?;
    let lng: f64 = lng.trim().parse().context("longitude is not a number")?;

    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude {lat} is out of range");
    }
    if !(-180.0..=180.0).contains(&lng) {
        bail!("longitude {lng} is out of range");
    }
    Ok(Coordinates::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_without_variables() {
        let config = config_from(&[(DATA_DIR_VAR, "/tmp/wm")]).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/wm"));
        assert_eq!(config.home, None);
        assert_eq!(config.zoom, DEFAULT_ZOOM);
        assert_eq!(config.storage_key, "workouts");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/wm/workouts.sqlite"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/wm/workout-mapper.log"));
    }

    #[test]
    fn reads_home_zoom_and_key() {
        let config = config_from(&[
            (DATA_DIR_VAR, "/tmp/wm"),
            (HOME_VAR, " 39.5 , -12.25 "),
            (ZOOM_VAR, "15"),
            (STORAGE_KEY_VAR, "runs"),
        ])
        .unwrap();

        assert_eq!(config.home, Some(Coordinates::new(39.5, -12.25)));
        assert_eq!(config.zoom, 15);
        assert_eq!(config.storage_key, "runs");
    }

    #[test]
    fn rejects_bad_values() {
        for (name, value) in [
            (HOME_VAR, "39.5"),
            (HOME_VAR, "north,south"),
            (HOME_VAR, "91,0"),
            (ZOOM_VAR, "zero"),
            (ZOOM_VAR, "25"),
        ] {
            assert!(
                config_from(&[(DATA_DIR_VAR, "/tmp/wm"), (name, value)]).is_err(),
                "{name}={value} should be rejected"
            );
        }
    }
}
