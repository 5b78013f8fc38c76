use serde::{Deserialize, Serialize};

pub const KTS_TO_KMH: f64 = 1.852;

/// Block time in whole minutes.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, Serialize, Deserialize, PartialOrd)]
pub struct Minutes(pub u64);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeSplit {
    pub hours: u64,
    pub minutes: u64,
}

impl Minutes {
    pub fn for_distance(distance_km: f64, speed_kmh: f64) -> Minutes {
        Minutes((distance_km / speed_kmh * 60.0).ceil() as u64)
    }

    pub fn split(&self) -> Option<TimeSplit> {
        if self.0 < 60 {
            return None;
        }
        Some(TimeSplit {
            hours: self.0 / 60,
            minutes: self.0 % 60,
        })
    }
}

impl std::fmt::Display for TimeSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

impl std::fmt::Display for Minutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.split() {
            Some(split) => write!(f, "{}", split),
            None => write!(f, "{} min", self.0),
        }
    }
}
