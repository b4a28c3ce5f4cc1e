use crate::types::{
    CasualtyRow, CasualtyTotals, DamageRow, DamageTotals, LabelCountRow, StormRecord, SummaryStats,
};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_TOP_N: usize = 20;

/// Injuries and fatalities per event type, highest combined total first.
pub fn aggregate_casualties(data: &[StormRecord]) -> Vec<CasualtyTotals> {
    let mut map: HashMap<&str, (u64, u64)> = HashMap::new();
    for r in data {
        let e = map.entry(r.event_type.as_str()).or_default();
        e.0 += u64::from(r.injuries);
        e.1 += u64::from(r.fatalities);
    }
    let mut rows: Vec<CasualtyTotals> = map
        .into_iter()
        .map(|(event_type, (injuries, fatalities))| CasualtyTotals {
            event_type: event_type.to_string(),
            injuries,
            fatalities,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total()
            .cmp(&a.total())
            .then_with(|| a.event_type.cmp(&b.event_type))
    });
    rows
}

/// Crop and property damage per event type, highest combined total first.
pub fn aggregate_damage(data: &[StormRecord]) -> Vec<DamageTotals> {
    let mut map: HashMap<&str, (f64, f64)> = HashMap::new();
    for r in data {
        let e = map.entry(r.event_type.as_str()).or_default();
        e.0 += r.crop_damage_value();
        e.1 += r.property_damage_value();
    }
    let mut rows: Vec<DamageTotals> = map
        .into_iter()
        .map(|(event_type, (crop_damage, property_damage))| DamageTotals {
            event_type: event_type.to_string(),
            crop_damage,
            property_damage,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total()
            .partial_cmp(&a.total())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.event_type.cmp(&b.event_type))
    });
    rows
}

/// The first `n` rows of an already ranked table.
pub fn top_n<T: Clone>(rows: &[T], n: usize) -> Vec<T> {
    rows.iter().take(n).cloned().collect()
}

pub fn render_casualties(rows: &[CasualtyTotals]) -> Vec<CasualtyRow> {
    rows.iter()
        .enumerate()
        .map(|(idx, r)| CasualtyRow {
            rank: idx + 1,
            event_type: r.event_type.clone(),
            injuries: format_number(r.injuries as f64, 0),
            fatalities: format_number(r.fatalities as f64, 0),
            total_casualties: format_number(r.total() as f64, 0),
        })
        .collect()
}

pub fn render_damage(rows: &[DamageTotals]) -> Vec<DamageRow> {
    rows.iter()
        .enumerate()
        .map(|(idx, r)| DamageRow {
            rank: idx + 1,
            event_type: r.event_type.clone(),
            crop_damage: format_number(r.crop_damage, 2),
            property_damage: format_number(r.property_damage, 2),
            total_damage: format_number(r.total(), 2),
        })
        .collect()
}

pub fn render_label_counts(counts: &[(String, usize)]) -> Vec<LabelCountRow> {
    counts
        .iter()
        .map(|(event_type, records)| LabelCountRow {
            event_type: event_type.clone(),
            records: *records,
        })
        .collect()
}

pub fn generate_summary(
    records_loaded: usize,
    distinct_raw_event_types: usize,
    data: &[StormRecord],
) -> SummaryStats {
    let distinct_normalized_event_types =
        crate::normalize::distinct_count(data.iter().map(|r| r.event_type.as_str()));
    SummaryStats {
        records_loaded,
        records_retained: data.len(),
        distinct_raw_event_types,
        distinct_normalized_event_types,
        total_fatalities: data.iter().map(|r| u64::from(r.fatalities)).sum(),
        total_injuries: data.iter().map(|r| u64::from(r.injuries)).sum(),
        total_property_damage: data.iter().map(|r| r.property_damage_value()).sum(),
        total_crop_damage: data.iter().map(|r| r.crop_damage_value()).sum(),
    }
}
