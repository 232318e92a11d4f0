//! INI parsing: `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::coord::{BoundingBox, GeoPoint};
use crate::mission::AspectRatio;

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

/// Parses `"lat,lon"`.
fn parse_point(key: &str, value: &str) -> Result<GeoPoint, ConfigFileError> {
    let reason = "expected 'lat,lon' in decimal degrees";
    let (lat, lon) = value
        .split_once(',')
        .ok_or_else(|| invalid("mission", key, value, reason))?;
    let lat: f64 = parse_value("mission", key, lat, reason)?;
    let lon: f64 = parse_value("mission", key, lon, reason)?;
    GeoPoint::new(lat, lon).map_err(|e| invalid("mission", key, value, e.to_string()))
}

/// Parses an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [mission] section
    if let Some(section) = ini.section(Some("mission")) {
        let mission = &mut config.mission;

        let top_left = match section.get("top_left") {
            Some(v) => parse_point("top_left", v)?,
            None => mission.bounds.top_left,
        };
        let bottom_right = match section.get("bottom_right") {
            Some(v) => parse_point("bottom_right", v)?,
            None => mission.bounds.bottom_right,
        };
        mission.bounds = BoundingBox::new(top_left, bottom_right).map_err(|e| {
            invalid(
                "mission",
                "bottom_right",
                &format!("{},{}", bottom_right.lat, bottom_right.lon),
                e.to_string(),
            )
        })?;

        if let Some(v) = section.get("altitude") {
            mission.altitude = parse_value("mission", "altitude", v, "must be a number (meters)")?;
            if mission.altitude <= 0.0 {
                return Err(invalid("mission", "altitude", v, "must be positive"));
            }
        }
        if let Some(v) = section.get("fov") {
            mission.fov = parse_value("mission", "fov", v, "must be a number (degrees)")?;
            if !(mission.fov > 0.0 && mission.fov < 180.0) {
                return Err(invalid("mission", "fov", v, "must be within (0, 180)"));
            }
        }
        if let Some(v) = section.get("aspect_ratio") {
            mission.aspect_ratio = v
                .parse::<AspectRatio>()
                .map_err(|reason| invalid("mission", "aspect_ratio", v, reason))?;
        }
        if let Some(v) = section.get("overlap") {
            mission.overlap = parse_value("mission", "overlap", v, "must be a number (percent)")?;
            if !(0.0..100.0).contains(&mission.overlap) {
                return Err(invalid("mission", "overlap", v, "must be within [0, 100)"));
            }
        }
        if let Some(v) = section.get("map_type") {
            mission.map_type = v
                .parse()
                .map_err(|reason: String| invalid("mission", "map_type", v, reason))?;
        }
        if let Some(v) = section.get("resolution") {
            mission.resolution =
                parse_value("mission", "resolution", v, "must be an integer from 0 to 22")?;
        }
        if let Some(v) = section.get("data_dir") {
            let v = v.trim();
            if !v.is_empty() {
                mission.data_dir = expand_tilde(v);
            }
        }
    }

    // [download] section
    if let Some(section) = ini.section(Some("download")) {
        let download = &mut config.download;

        if let Some(v) = section.get("max_attempts") {
            download.max_attempts =
                parse_value("download", "max_attempts", v, "must be a positive integer")?;
            if download.max_attempts == 0 {
                return Err(invalid("download", "max_attempts", v, "must be at least 1"));
            }
        }
        if let Some(v) = section.get("retry_delay_ms") {
            download.retry_delay_ms = parse_value(
                "download",
                "retry_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("max_concurrent") {
            download.max_concurrent =
                parse_value("download", "max_concurrent", v, "must be a positive integer")?;
            if download.max_concurrent == 0 {
                return Err(invalid("download", "max_concurrent", v, "must be at least 1"));
            }
        }
        if let Some(v) = section.get("timeout") {
            download.timeout = parse_value(
                "download",
                "timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
            if download.timeout == 0 {
                return Err(invalid("download", "timeout", v, "must be at least 1 second"));
            }
        }
    }

    // [provider] section
    if let Some(section) = ini.section(Some("provider")) {
        if let Some(v) = section.get("google_api_key") {
            let v = v.trim();
            if !v.is_empty() {
                config.provider.google_api_key = Some(v.to_string());
            }
        }
    }

    Ok(config)
}

/// Expands a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::provider::MapType;

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(text).unwrap();
        parse_ini(&ini)
    }

    fn invalid_key(result: Result<ConfigFile, ConfigFileError>) -> String {
        match result {
            Err(ConfigFileError::InvalidValue { key, .. }) => key,
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_mission_overrides() {
        let config = parse(
            "[mission]\n\
             top_left = 40.0, -74.1\n\
             bottom_right = 39.9,-74.0\n\
             altitude = 200\n\
             fov = 60\n\
             aspect_ratio = 16:9\n\
             overlap = 25\n\
             map_type = Roadmap\n\
             resolution = 1\n\
             data_dir = out/nyc\n",
        )
        .unwrap();

        let mission = &config.mission;
        assert_eq!(mission.bounds.top_left, GeoPoint { lat: 40.0, lon: -74.1 });
        assert_eq!(mission.bounds.bottom_right, GeoPoint { lat: 39.9, lon: -74.0 });
        assert_eq!(mission.altitude, 200.0);
        assert_eq!(mission.fov, 60.0);
        assert_eq!(mission.aspect_ratio, AspectRatio::new(16.0, 9.0));
        assert_eq!(mission.overlap, 25.0);
        assert_eq!(mission.map_type, MapType::Roadmap);
        assert_eq!(mission.resolution, 1);
        assert_eq!(mission.data_dir, PathBuf::from("out/nyc"));

        let params = mission.to_params();
        assert_eq!(params.overlap_percent, 25.0);
        assert_eq!(params.bounds, mission.bounds);
    }

    #[test]
    fn test_single_corner_keeps_other_default() {
        let config = parse("[mission]\nbottom_right = 35.1,-89.8\n").unwrap();
        assert_eq!(config.mission.bounds.top_left, DEFAULT_TOP_LEFT);
        assert_eq!(config.mission.bounds.bottom_right.lat, 35.1);
    }

    #[test]
    fn test_invalid_mission_values() {
        assert_eq!(invalid_key(parse("[mission]\ntop_left = 35.1\n")), "top_left");
        assert_eq!(invalid_key(parse("[mission]\ntop_left = 95,-89\n")), "top_left");
        assert_eq!(
            invalid_key(parse("[mission]\nbottom_right = 36.0,-89.8\n")),
            "bottom_right"
        );
        assert_eq!(invalid_key(parse("[mission]\naltitude = -5\n")), "altitude");
        assert_eq!(invalid_key(parse("[mission]\nfov = 180\n")), "fov");
        assert_eq!(invalid_key(parse("[mission]\noverlap = 100\n")), "overlap");
        assert_eq!(invalid_key(parse("[mission]\nmap_type = hybrid\n")), "map_type");
        assert_eq!(invalid_key(parse("[mission]\nresolution = x\n")), "resolution");
        assert_eq!(
            invalid_key(parse("[mission]\naspect_ratio = wide\n")),
            "aspect_ratio"
        );
    }

    #[test]
    fn test_download_section() {
        let config = parse(
            "[download]\nmax_attempts = 3\nretry_delay_ms = 250\nmax_concurrent = 8\ntimeout = 5\n",
        )
        .unwrap();
        let stitch = config.download.stitch_config();
        assert_eq!(stitch.max_attempts(), 3);
        assert_eq!(stitch.retry_delay(), std::time::Duration::from_millis(250));
        assert_eq!(stitch.max_concurrent(), 8);
        assert_eq!(stitch.request_timeout(), std::time::Duration::from_secs(5));

        assert_eq!(
            invalid_key(parse("[download]\nmax_attempts = 0\n")),
            "max_attempts"
        );
        assert_eq!(
            invalid_key(parse("[download]\nmax_concurrent = many\n")),
            "max_concurrent"
        );
        assert_eq!(invalid_key(parse("[download]\ntimeout = 0\n")), "timeout");
    }

    #[test]
    fn test_blank_api_key_is_none() {
        assert!(parse("[provider]\ngoogle_api_key =\n")
            .unwrap()
            .provider
            .google_api_key
            .is_none());
        assert_eq!(
            parse("[provider]\ngoogle_api_key = key-1\n")
                .unwrap()
                .provider
                .google_api_key
                .as_deref(),
            Some("key-1")
        );
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("data/x"), PathBuf::from("data/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/data"), home.join("data"));
        }
    }
}
