use crate::error::{read_json, DataError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Inclusive `[low, high]` block of flight numbers. Written as a two-element array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct NumberRange {
    low: u32,
    high: u32,
}

impl NumberRange {
    pub fn new(low: u32, high: u32) -> Result<NumberRange, String> {
        if low > high {
            return Err(format!("invalid flight number range [{}, {}]", low, high));
        }
        Ok(NumberRange { low, high })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.low..=self.high)
    }
}

impl TryFrom<(u32, u32)> for NumberRange {
    type Error = String;

    fn try_from((low, high): (u32, u32)) -> Result<Self, Self::Error> {
        NumberRange::new(low, high)
    }
}

impl From<NumberRange> for (u32, u32) {
    fn from(range: NumberRange) -> Self {
        (range.low, range.high)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeChoice {
    Single(NumberRange),
    Many(Vec<NumberRange>),
}

impl RangeChoice {
    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<NumberRange> {
        match self {
            RangeChoice::Single(range) => Some(*range),
            RangeChoice::Many(ranges) => ranges.choose(rng).copied(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightNumberRule {
    pub prefix: String,
    #[serde(default)]
    pub icao_ranges: HashMap<String, RangeChoice>,
    pub default_range: NumberRange,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightNumber {
    pub prefix: String,
    pub number: u32,
}

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.number)
    }
}

/// Flight-number rules keyed by lowercased airline name.
#[derive(Clone, Debug, Default)]
pub struct FlightNumbers {
    rules: HashMap<String, FlightNumberRule>,
}

impl FlightNumbers {
    /// Normalizes keys: airline names to lowercase, airport codes to uppercase.
    /// Two keys that only differ by case are rejected and the offending key is returned.
    pub fn new(rules: HashMap<String, FlightNumberRule>) -> Result<FlightNumbers, String> {
        let mut normalized = HashMap::with_capacity(rules.len());
        for (airline, mut rule) in rules {
            let mut icao_ranges = HashMap::with_capacity(rule.icao_ranges.len());
            for (icao, ranges) in rule.icao_ranges {
                let icao = icao.trim().to_uppercase();
                if icao_ranges.insert(icao.clone(), ranges).is_some() {
                    return Err(format!("{}.icao_ranges.{}", airline.trim(), icao));
                }
            }
            rule.icao_ranges = icao_ranges;
            let airline = airline.trim().to_lowercase();
            if normalized.insert(airline.clone(), rule).is_some() {
                return Err(airline);
            }
        }
        Ok(FlightNumbers { rules: normalized })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DataError> {
        let raw: HashMap<String, FlightNumberRule> = read_json(path)?;
        FlightNumbers::new(raw).map_err(|key| DataError::DuplicateKey {
            path: path.to_path_buf(),
            key,
        })
    }

    pub fn rule(&self, airline: &str) -> Option<&FlightNumberRule> {
        self.rules.get(&airline.trim().to_lowercase())
    }

    /// `None` when no rule exists for the airline.
    pub fn generate<R: Rng + ?Sized>(&self, airline: &str, departure_icao: &str, rng: &mut R) -> Option<FlightNumber> {
        let rule = self.rule(airline)?;
        let range = rule
            .icao_ranges
            .get(&departure_icao.trim().to_uppercase())
            .and_then(|choice| choice.pick(rng))
            .unwrap_or(rule.default_range);
        Some(FlightNumber {
            prefix: rule.prefix.clone(),
            number: range.sample(rng),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    const CONFIG: &str = r#"{
        "British Airways": {
            "prefix": "BAW",
            "icao_ranges": {
                "EGLL": [1, 999],
                "egkk": [2000, 2899],
                "EGLC": [[3000, 3500], [4000, 4500]]
            },
            "default_range": [1300, 1499]
        },
        "easyjet": {
            "prefix": "EZY",
            "icao_ranges": {"EGKK": [[6000, 6999], [8000, 8999]]},
            "default_range": [7000, 7999]
        }
    }"#;

    fn numbers() -> FlightNumbers {
        FlightNumbers::new(serde_json::from_str(CONFIG).unwrap()).unwrap()
    }

    #[test]
    fn test_airport_specific_range() {
        let numbers = numbers();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let fln = numbers.generate("British Airways", "EGLL", &mut rng).unwrap();
            assert_eq!("BAW", fln.prefix);
            assert!((1..=999).contains(&fln.number));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let numbers = numbers();
        let mut rng = StdRng::seed_from_u64(1);
        let fln = numbers.generate("  BRITISH airways ", "egkk", &mut rng).unwrap();
        assert!((2000..=2899).contains(&fln.number));
        assert_eq!("EZY", numbers.generate("EasyJet", "EGGW", &mut rng).unwrap().prefix);
    }

    #[test]
    fn test_default_range_for_other_airports() {
        let numbers = numbers();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let fln = numbers.generate("easyJet", "LFPG", &mut rng).unwrap();
            assert!((7000..=7999).contains(&fln.number));
        }
    }

    #[test]
    fn test_multiple_ranges_cover_both_blocks() {
        let numbers = numbers();
        let mut rng = StdRng::seed_from_u64(11);
        let drawn: Vec<u32> = (0..300)
            .map(|_| numbers.generate("easyJet", "EGKK", &mut rng).unwrap().number)
            .collect();
        assert!(drawn.iter().all(|n| (6000..=6999).contains(n) || (8000..=8999).contains(n)));
        assert!(drawn.iter().any(|n| *n < 7000));
        assert!(drawn.iter().any(|n| *n >= 8000));
    }

    #[test]
    fn test_unknown_airline() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(None, numbers().generate("Pan Am", "KJFK", &mut rng));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let bad = r#"{"x": {"prefix": "X", "default_range": [10, 1]}}"#;
        assert!(serde_json::from_str::<HashMap<String, FlightNumberRule>>(bad).is_err());
    }

    #[test]
    fn test_keys_differing_only_by_case_are_rejected() {
        let airports = r#"{"easyJet": {"prefix": "EZY", "default_range": [1, 9],
            "icao_ranges": {"EGKK": [1, 2], "egkk": [3, 4]}}}"#;
        let err = FlightNumbers::new(serde_json::from_str(airports).unwrap()).unwrap_err();
        assert_eq!("easyJet.icao_ranges.EGKK", err);

        let airlines = r#"{
            "British Airways": {"prefix": "BAW", "default_range": [1, 9]},
            "british airways": {"prefix": "SHT", "default_range": [1, 9]}
        }"#;
        assert_eq!(Err("british airways".to_string()), FlightNumbers::new(serde_json::from_str(airlines).unwrap()).map(|_| ()));
    }

    #[test]
    fn test_duplicate_key_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ryanair": {{"prefix": "RYR", "default_range": [1, 9]}}, "Ryanair": {{"prefix": "RYR", "default_range": [1, 9]}}}}"#).unwrap();
        file.flush().unwrap();

        match FlightNumbers::load_from_file(file.path()) {
            Err(DataError::DuplicateKey { key, .. }) => assert_eq!("ryanair", key),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_display() {
        let fln = FlightNumber { prefix: "BAW".to_string(), number: 117 };
        assert_eq!("BAW117", fln.to_string());
    }

    proptest! {
        #[test]
        fn test_sample_stays_in_range(low in 0..10_000u32, span in 0..5_000u32, seed in any::<u64>()) {
            let range = NumberRange::new(low, low + span).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let n = range.sample(&mut rng);
            prop_assert!((low..=low + span).contains(&n));
        }
    }
}
