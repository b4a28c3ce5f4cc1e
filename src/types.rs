use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// The twelve storm-database columns the pipeline consumes. Every other
/// column in the source is skipped by serde.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "STATE")]
    pub state: Option<String>,
    #[serde(rename = "COUNTYNAME")]
    pub county_name: Option<String>,
    #[serde(rename = "BGN_DATE")]
    pub begin_date: Option<String>,
    #[serde(rename = "EVTYPE")]
    pub event_type: Option<String>,
    #[serde(rename = "FATALITIES")]
    pub fatalities: Option<String>,
    #[serde(rename = "INJURIES")]
    pub injuries: Option<String>,
    #[serde(rename = "PROPDMG")]
    pub prop_dmg: Option<String>,
    #[serde(rename = "PROPDMGEXP")]
    pub prop_dmg_exp: Option<String>,
    #[serde(rename = "CROPDMG")]
    pub crop_dmg: Option<String>,
    #[serde(rename = "CROPDMGEXP")]
    pub crop_dmg_exp: Option<String>,
    #[serde(rename = "REMARKS")]
    pub remarks: Option<String>,
    #[serde(rename = "REFNUM")]
    pub ref_num: Option<String>,
}

/// One reported storm event after parsing.
///
/// `event_type` is rewritten in place by the normalizer. Monetary values are
/// never stored; see the accessors in [`crate::damage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormRecord {
    pub state: String,
    pub county_name: String,
    pub event_type: String,
    /// `None` when the source date could not be parsed.
    pub begin_date: Option<NaiveDateTime>,
    pub reference_id: u64,
    pub fatalities: u32,
    pub injuries: u32,
    pub prop_dmg_magnitude: f64,
    pub prop_dmg_exp: String,
    pub crop_dmg_magnitude: f64,
    pub crop_dmg_exp: String,
    pub remarks: String,
}

/// Summed casualties for one event type.
#[derive(Debug, Clone, PartialEq)]
pub struct CasualtyTotals {
    pub event_type: String,
    pub injuries: u64,
    pub fatalities: u64,
}

impl CasualtyTotals {
    pub fn total(&self) -> u64 {
        self.injuries + self.fatalities
    }
}

/// Summed damage (USD) for one event type.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageTotals {
    pub event_type: String,
    pub crop_damage: f64,
    pub property_damage: f64,
}

impl DamageTotals {
    pub fn total(&self) -> f64 {
        self.crop_damage + self.property_damage
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CasualtyRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "EventType")]
    #[tabled(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "Injuries")]
    #[tabled(rename = "Injuries")]
    pub injuries: String,
    #[serde(rename = "Fatalities")]
    #[tabled(rename = "Fatalities")]
    pub fatalities: String,
    #[serde(rename = "TotalCasualties")]
    #[tabled(rename = "TotalCasualties")]
    pub total_casualties: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DamageRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "EventType")]
    #[tabled(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "CropDamage")]
    #[tabled(rename = "CropDamage")]
    pub crop_damage: String,
    #[serde(rename = "PropertyDamage")]
    #[tabled(rename = "PropertyDamage")]
    pub property_damage: String,
    #[serde(rename = "TotalDamage")]
    #[tabled(rename = "TotalDamage")]
    pub total_damage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct LabelCountRow {
    #[serde(rename = "EventType")]
    #[tabled(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "Records")]
    #[tabled(rename = "Records")]
    pub records: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub records_loaded: usize,
    pub records_retained: usize,
    pub distinct_raw_event_types: usize,
    pub distinct_normalized_event_types: usize,
    pub total_fatalities: u64,
    pub total_injuries: u64,
    pub total_property_damage: f64,
    pub total_crop_damage: f64,
}
