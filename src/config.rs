use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_REFERENCE_KTS: f64 = 470.0;
pub const DEFAULT_LOGO_URL: &str = "https://images.kiwi.com/airlines/64/{iata}.png";

/// Cruise speed argument: a positive, finite number of knots.
pub fn parse_speed(value: &str) -> Result<f64, String> {
    let kts: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !kts.is_finite() || kts <= 0.0 {
        return Err(format!("cruise speed must be positive, got {}", value));
    }
    Ok(kts)
}

/// File locations, all relative to `--root` unless given as absolute paths.
#[derive(Args, Clone, Debug)]
pub struct Paths {
    /// Project root holding rawdata/, config/ and data/
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Directory with the per-airline route files
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "rawdata/airline_routes.json")]
    pub route_graph: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "rawdata/airports.csv")]
    pub airports: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "rawdata/airlines.json")]
    pub airlines: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "rawdata/ValidAirlines.json")]
    pub valid_airlines: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "config/aircraft.json")]
    pub aircraft: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "config/flight_numbers.json")]
    pub flight_numbers: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "config/userData.json")]
    pub user_data: PathBuf,
}

impl Paths {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    pub fn logo_dir(&self) -> PathBuf {
        self.data_dir().join("logos")
    }
}

/// Per-user settings persisted between sessions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub simbrief_user_id: Option<String>,
}

impl UserData {
    /// A missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> UserData {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {}: {}", path.display(), e);
                UserData::default()
            }),
            Err(_) => UserData::default(),
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        paths: Paths,
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let paths = Cli::parse_from(["routepicker", "--root", "/srv/routes"]).paths;
        assert_eq!(PathBuf::from("/srv/routes/rawdata/airports.csv"), paths.resolve(&paths.airports));
        assert_eq!(PathBuf::from("/srv/routes/data"), paths.data_dir());
        assert_eq!(PathBuf::from("/srv/routes/data/logos"), paths.logo_dir());
        assert_eq!(PathBuf::from("/tmp/x.json"), paths.resolve(Path::new("/tmp/x.json")));
    }

    #[test]
    fn test_speed_must_be_positive() {
        assert_eq!(Ok(470.0), parse_speed("470"));
        assert_eq!(Ok(488.5), parse_speed(" 488.5 "));
        assert!(parse_speed("0").is_err());
        assert!(parse_speed("-450").is_err());
        assert!(parse_speed("NaN").is_err());
        assert!(parse_speed("inf").is_err());
        assert!(parse_speed("fast").is_err());
    }

    #[test]
    fn test_user_data_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("userData.json");
        assert_eq!(UserData::default(), UserData::load(&path));

        let data = UserData { simbrief_user_id: Some("123456".to_string()) };
        data.save(&path).unwrap();
        assert_eq!(data, UserData::load(&path));
    }
}
