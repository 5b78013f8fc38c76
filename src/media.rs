use crate::airline::{file_stem, Airline, AirlineDirectory};
use crate::error::FetchError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const LOGO_TIMEOUT: Duration = Duration::from_secs(10);

pub fn logo_path(dir: &Path, airline: &str) -> PathBuf {
    dir.join(format!("{}.png", file_stem(airline)))
}

#[derive(Debug, PartialEq)]
pub enum LogoOutcome {
    Downloaded(PathBuf),
    AlreadyPresent(PathBuf),
}

#[derive(Debug, Default, PartialEq)]
pub struct MediaReport {
    pub downloaded: usize,
    pub present: usize,
    pub failed: Vec<String>,
}

/// Downloads airline logos from an image repository keyed by IATA code.
pub struct LogoFetcher {
    client: reqwest::blocking::Client,
    url_template: String,
    dir: PathBuf,
}

impl LogoFetcher {
    pub fn new(url_template: &str, dir: &Path) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(LOGO_TIMEOUT)
            .build()?;
        Ok(LogoFetcher {
            client,
            url_template: url_template.to_string(),
            dir: dir.to_path_buf(),
        })
    }

    pub fn logo_url(&self, iata: &str) -> String {
        self.url_template.replace("{iata}", &iata.trim().to_uppercase())
    }

    pub fn fetch(&self, airline: &Airline) -> Result<LogoOutcome, FetchError> {
        let path = logo_path(&self.dir, &airline.name);
        if path.exists() {
            return Ok(LogoOutcome::AlreadyPresent(path));
        }
        let iata = airline
            .iata_code()
            .ok_or_else(|| FetchError::Payload(format!("{} has no IATA code", airline.name)))?;

        let url = self.logo_url(iata);
        let response = self.client.get(&url).send()?.error_for_status()?;
        let is_image = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|v| v.starts_with("image/"));
        if !is_image {
            return Err(FetchError::Payload(format!("{} did not return an image", url)));
        }
        let bytes = response.bytes()?;

        fs::create_dir_all(&self.dir)?;
        fs::write(&path, &bytes)?;
        log::debug!("Saved logo for {} ({} bytes)", airline.name, bytes.len());
        Ok(LogoOutcome::Downloaded(path))
    }

    /// Fetches every airline's logo, logging failures instead of stopping.
    pub fn fetch_all<'a>(&self, airlines: impl IntoIterator<Item = &'a Airline>) -> MediaReport {
        let mut report = MediaReport::default();
        for airline in airlines {
            match self.fetch(airline) {
                Ok(LogoOutcome::Downloaded(_)) => report.downloaded += 1,
                Ok(LogoOutcome::AlreadyPresent(_)) => report.present += 1,
                Err(e) => {
                    log::warn!("No logo for {}: {}", airline.name, e);
                    report.failed.push(airline.name.to_string());
                }
            }
        }
        report
    }
}

/// Airlines among `names` without a logo file in `dir`.
pub fn missing_logos<'a>(dir: &Path, names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    names
        .into_iter()
        .filter(|name| !logo_path(dir, name).exists())
        .collect()
}

/// Directory entries for the airlines among `names` that still lack a logo.
/// Names missing from the directory are logged and skipped.
pub fn backfill_targets<'a>(dir: &Path, names: &[&str], airlines: &'a AirlineDirectory) -> Vec<&'a Airline> {
    missing_logos(dir, names.iter().copied())
        .into_iter()
        .filter_map(|name| {
            let airline = airlines.by_name(name);
            if airline.is_none() {
                log::warn!("{} is not in the airline directory, cannot fetch its logo", name);
            }
            airline
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_url_template() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = LogoFetcher::new("https://img.example/airlines/{iata}.png", dir.path()).unwrap();
        assert_eq!("https://img.example/airlines/U2.png", fetcher.logo_url(" u2"));
    }

    #[test]
    fn test_existing_logo_is_not_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(logo_path(dir.path(), "British Airways"), b"png").unwrap();
        let fetcher = LogoFetcher::new("http://127.0.0.1:9/{iata}.png", dir.path()).unwrap();
        let ba = Airline {
            name: "British Airways".into(),
            iata: Some("BA".to_string()),
            icao: Some("BAW".to_string()),
            callsign: None,
            aircraft: None,
        };
        assert_eq!(
            LogoOutcome::AlreadyPresent(dir.path().join("british_airways.png")),
            fetcher.fetch(&ba).unwrap()
        );
    }

    #[test]
    fn test_backfill_needs_only_the_airline_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(logo_path(dir.path(), "easyJet"), b"png").unwrap();
        let directory = AirlineDirectory::new(vec![
            Airline {
                name: "easyJet".into(),
                iata: Some("U2".to_string()),
                icao: None,
                callsign: None,
                aircraft: None,
            },
            Airline {
                name: "Ryanair".into(),
                iata: Some("FR".to_string()),
                icao: None,
                callsign: None,
                aircraft: None,
            },
        ]);

        let targets = backfill_targets(dir.path(), &["easyJet", "Ryanair", "Ghost Air"], &directory);

        let names: Vec<&str> = targets.iter().map(|a| a.name.as_ref()).collect();
        assert_eq!(vec!["Ryanair"], names);
    }

    #[test]
    fn test_missing_logos() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(logo_path(dir.path(), "easyJet"), b"png").unwrap();
        assert_eq!(vec!["Ryanair"], missing_logos(dir.path(), ["easyJet", "Ryanair"]));
    }
}
