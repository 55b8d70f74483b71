//! Daily prayer times for students who keep religious observance.
//!
//! Times come from the usual solar-position approximation: sun declination
//! and equation of time from the Julian day, then the hour angle at which the
//! sun reaches each prayer's depression angle.
//!
//! ```text
//! Fajr  = noon - H(fajr_angle)        Sunrise = noon - H(0.833)
//! Dhuhr = solar noon                  Asr     = noon + H(asr altitude)
//! Maghrib = noon + H(0.833)           Isha    = noon + H(isha_angle)
//! ```
//!
//! A prayer whose angle is never reached on that date (high latitudes around
//! the solstices) has no time.

use chrono::{NaiveDate, NaiveTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sun depression below the horizon at sunrise/sunset, including refraction.
const HORIZON_DEPRESSION: f64 = 0.833;

/// Fajr/Isha angle conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    #[default]
    MoonsightingCommittee,
    MuslimWorldLeague,
    NorthAmerica,
    Egyptian,
}

impl CalculationMethod {
    /// `(fajr_angle, isha_angle)` in degrees below the horizon.
    pub fn angles(&self) -> (f64, f64) {
        match self {
            Self::MoonsightingCommittee => (18.0, 18.0),
            Self::MuslimWorldLeague => (18.0, 17.0),
            Self::NorthAmerica => (15.0, 15.0),
            Self::Egyptian => (19.5, 17.5),
        }
    }
}

/// Shadow-length rule for Asr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsrMethod {
    #[default]
    Standard,
    Hanafi,
}

impl AsrMethod {
    fn shadow_factor(&self) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::Hanafi => 2.0,
        }
    }
}

/// Where and how prayer times are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservanceConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Hours east of UTC. Falls back to the machine's local offset.
    #[serde(default)]
    pub utc_offset_hours: Option<f64>,
    #[serde(default)]
    pub method: CalculationMethod,
    #[serde(default)]
    pub asr_method: AsrMethod,
    /// Length of each observance window in the plan.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
}

// Raleigh, NC
fn default_latitude() -> f64 {
    35.7897507
}
fn default_longitude() -> f64 {
    -78.6912485
}
fn default_window_minutes() -> u32 {
    15
}

impl Default for ObservanceConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            utc_offset_hours: None,
            method: CalculationMethod::default(),
            asr_method: AsrMethod::default(),
            window_minutes: default_window_minutes(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fajr => "Fajr",
            Self::Dhuhr => "Dhuhr",
            Self::Asr => "Asr",
            Self::Maghrib => "Maghrib",
            Self::Isha => "Isha",
        })
    }
}

/// One prayer's time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservanceWindow {
    pub prayer: Prayer,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Local prayer times for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub date: NaiveDate,
    pub fajr: Option<NaiveTime>,
    pub sunrise: Option<NaiveTime>,
    pub dhuhr: Option<NaiveTime>,
    pub asr: Option<NaiveTime>,
    pub maghrib: Option<NaiveTime>,
    pub isha: Option<NaiveTime>,
}

impl PrayerTimes {
    pub fn compute(date: NaiveDate, config: &ObservanceConfig) -> Self {
        let offset = config
            .utc_offset_hours
            .unwrap_or_else(|| local_offset_hours(date));
        let lat = config.latitude;

        // Sun position near local solar noon.
        let jd = julian_day(date) - config.longitude / (15.0 * 24.0) + 0.5;
        let (decl, eqt) = sun_position(jd);
        let noon = fix_hour(12.0 - eqt);

        let hour_angle = |angle: f64| -> Option<f64> {
            let cos_t = (-dsin(angle) - dsin(decl) * dsin(lat)) / (dcos(decl) * dcos(lat));
            (-1.0..=1.0)
                .contains(&cos_t)
                .then(|| darccos(cos_t) / 15.0)
        };

        let (fajr_angle, isha_angle) = config.method.angles();
        let asr_angle = -darccot(config.asr_method.shadow_factor() + dtan((lat - decl).abs()));

        let to_local = |solar: Option<f64>| -> Option<NaiveTime> {
            solar.and_then(|h| hours_to_time(h + offset - config.longitude / 15.0))
        };

        let times = Self {
            date,
            fajr: to_local(hour_angle(fajr_angle).map(|t| noon - t)),
            sunrise: to_local(hour_angle(HORIZON_DEPRESSION).map(|t| noon - t)),
            dhuhr: to_local(Some(noon)),
            asr: to_local(hour_angle(asr_angle).map(|t| noon + t)),
            maghrib: to_local(hour_angle(HORIZON_DEPRESSION).map(|t| noon + t)),
            isha: to_local(hour_angle(isha_angle).map(|t| noon + t)),
        };
        tracing::debug!(%date, lat, lon = config.longitude, offset, "computed prayer times");
        times
    }

    pub fn time_of(&self, prayer: Prayer) -> Option<NaiveTime> {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }

    /// Windows of `minutes` starting at each prayer time. Prayers with no
    /// time on this date are left out.
    pub fn windows(&self, minutes: u32) -> Vec<ObservanceWindow> {
        let length = chrono::Duration::minutes(i64::from(minutes));
        [
            Prayer::Fajr,
            Prayer::Dhuhr,
            Prayer::Asr,
            Prayer::Maghrib,
            Prayer::Isha,
        ]
        .into_iter()
        .filter_map(|prayer| {
            let start = self.time_of(prayer)?;
            Some(ObservanceWindow {
                prayer,
                start,
                end: start + length,
            })
        })
        .collect()
    }
}

/// Render the day's windows for embedding in the generation prompt, e.g.
/// `Fajr 05:43-05:58, Dhuhr 12:04-12:19, ...`.
pub fn observance_windows(date: NaiveDate, config: &ObservanceConfig) -> String {
    let windows = PrayerTimes::compute(date, config).windows(config.window_minutes);
    if windows.is_empty() {
        return "no prayer times available for this location".to_string();
    }
    windows
        .iter()
        .map(|w| {
            format!(
                "{} {}-{}",
                w.prayer,
                w.start.format("%H:%M"),
                w.end.format("%H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Solar math ───────────────────────────────────────────────────────

fn julian_day(date: NaiveDate) -> f64 {
    use chrono::Datelike;
    let (mut year, mut month) = (date.year() as f64, date.month() as f64);
    let day = date.day() as f64;
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }
    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day + b - 1524.5
}

/// Returns `(declination_degrees, equation_of_time_hours)`.
fn sun_position(jd: f64) -> (f64, f64) {
    let d = jd - 2451545.0;
    let g = fix_angle(357.529 + 0.98560028 * d);
    let q = fix_angle(280.459 + 0.98564736 * d);
    let l = fix_angle(q + 1.915 * dsin(g) + 0.020 * dsin(2.0 * g));
    let e = 23.439 - 0.00000036 * d;

    let ra = fix_hour(darctan2(dcos(e) * dsin(l), dcos(l)) / 15.0);
    let eqt = q / 15.0 - ra;
    let decl = darcsin(dsin(e) * dsin(l));
    (decl, eqt)
}

fn hours_to_time(hours: f64) -> Option<NaiveTime> {
    let minutes = (fix_hour(hours) * 60.0).round() as u32 % (24 * 60);
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0)
}

fn local_offset_hours(date: NaiveDate) -> f64 {
    date.and_hms_opt(12, 0, 0)
        .and_then(|noon| chrono::Local.from_local_datetime(&noon).earliest())
        .map(|dt| f64::from(dt.offset().fix().local_minus_utc()) / 3600.0)
        .unwrap_or(0.0)
}

fn fix_angle(a: f64) -> f64 {
    a.rem_euclid(360.0)
}
fn fix_hour(h: f64) -> f64 {
    h.rem_euclid(24.0)
}
fn dsin(d: f64) -> f64 {
    d.to_radians().sin()
}
fn dcos(d: f64) -> f64 {
    d.to_radians().cos()
}
fn dtan(d: f64) -> f64 {
    d.to_radians().tan()
}
fn darcsin(x: f64) -> f64 {
    x.asin().to_degrees()
}
fn darccos(x: f64) -> f64 {
    x.acos().to_degrees()
}
fn darctan2(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}
fn darccot(x: f64) -> f64 {
    (1.0 / x).atan().to_degrees()
}
