//! Snapshot payload and derived classification types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hour reported by the simulation service.
///
/// The service normally sends an integer hour of day, but a free-form label
/// is accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hour {
    /// Integer hour (0-23 in practice).
    Ordinal(u32),
    /// Arbitrary label, e.g. `"14:00"`.
    Label(String),
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinal(h) => write!(f, "{h}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

/// Power delivered to each load class (kW).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    /// Hospital allocation (kW).
    pub hospital_kw: f64,
    /// School allocation (kW).
    pub school_kw: f64,
    /// Residential allocation (kW).
    pub homes_kw: f64,
}

/// One simulation result, exactly as returned by `GET /simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hour of day the result applies to.
    pub hour: Hour,
    /// Weather category the simulation ran with.
    pub weather: String,
    /// Number of homes on the grid.
    pub homes: u32,
    /// Solar generation (kW).
    pub solar_power_kw: f64,
    /// Battery state of charge (percent).
    pub battery_level_percent: f64,
    /// Aggregate demand (kW).
    pub total_demand_kw: f64,
    /// Aggregate supply (kW).
    pub total_supply_kw: f64,
    /// Priority allocation of the available supply.
    pub distribution: Distribution,
    /// Advisory strings, in service order.
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    /// Free-text alert message.
    #[serde(default)]
    pub alert: String,
    /// Battery contribution to supply (kW).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_support_kw: Option<f64>,
    /// Battery capacity the simulation used (kWh).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_capacity_kwh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<String>,
}

impl Snapshot {
    /// Classifies this snapshot by comparing supply against demand.
    pub fn status(&self) -> Status {
        Status::classify(self.total_demand_kw, self.total_supply_kw)
    }

    /// Checks that every numeric field is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns the name and value of the first offending field.
    pub fn validate(&self) -> Result<(), (&'static str, f64)> {
        let required = [
            ("solar_power_kw", self.solar_power_kw),
            ("battery_level_percent", self.battery_level_percent),
            ("total_demand_kw", self.total_demand_kw),
            ("total_supply_kw", self.total_supply_kw),
            ("distribution.hospital_kw", self.distribution.hospital_kw),
            ("distribution.school_kw", self.distribution.school_kw),
            ("distribution.homes_kw", self.distribution.homes_kw),
        ];
        let optional = [
            ("battery_support_kw", self.battery_support_kw),
            ("battery_capacity_kwh", self.battery_capacity_kwh),
            ("cloud_cover_percent", self.cloud_cover_percent),
        ];

        let all = required
            .into_iter()
            .chain(optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));
        for (field, value) in all {
            if !value.is_finite() || value < 0.0 {
                return Err((field, value));
            }
        }
        Ok(())
    }
}

/// Supply/demand balance classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Supply covers demand (equality included).
    Ok,
    /// Demand exceeds supply.
    Shortage,
}

impl Status {
    /// `Ok` when `supply_kw >= demand_kw`, otherwise `Shortage`.
    ///
    /// ```
    /// use microgrid_monitor::monitor::types::Status;
    ///
    /// assert_eq!(Status::classify(100.0, 100.0), Status::Ok);
    /// assert_eq!(Status::classify(100.0, 99.9), Status::Shortage);
    /// ```
    pub fn classify(demand_kw: f64, supply_kw: f64) -> Self {
        if supply_kw >= demand_kw {
            Self::Ok
        } else {
            Self::Shortage
        }
    }

    /// Returns `true` for [`Status::Shortage`].
    pub fn is_shortage(self) -> bool {
        self == Self::Shortage
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Shortage => "SHORTAGE",
        })
    }
}

/// Direction of change relative to the previous accepted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Up,
    Down,
    /// No prior value, or the value did not change.
    #[default]
    None,
}

impl Trend {
    /// Arrow glyph appended to stat values (empty for [`Trend::None`]).
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↑",
            Self::Down => "↓",
            Self::None => "",
        }
    }
}

/// A snapshot together with its derived status and trend arrows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedSnapshot {
    /// The snapshot as received.
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// OK/SHORTAGE classification at acceptance time.
    pub status: Status,
    /// Demand direction vs. the previous accepted snapshot.
    pub demand_trend: Trend,
    /// Supply direction vs. the previous accepted snapshot.
    pub supply_trend: Trend,
}
