// Event-type normalization.
//
// The raw `EVTYPE` column holds a few hundred free-text spellings of roughly
// fifty documented categories. The rules below fold the spellings that carry
// the bulk of the casualties and damage onto their documented labels.
//
// Rules run in table order and each one sees the label as rewritten by the
// rules before it. A label that no rule matches passes through unchanged.
use crate::types::StormRecord;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Case-insensitive test over an event-type label.
///
/// Keywords are stored upper-case; the haystack is upper-cased once per
/// rule before evaluation.
#[derive(Debug, Clone)]
pub enum Predicate {
    ContainsAny(&'static [&'static str]),
    ContainsAll(&'static [&'static str]),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
}

pub fn contains_any(keywords: &'static [&'static str]) -> Predicate {
    Predicate::ContainsAny(keywords)
}

pub fn contains_all(keywords: &'static [&'static str]) -> Predicate {
    Predicate::ContainsAll(keywords)
}

pub fn not(inner: Predicate) -> Predicate {
    Predicate::Not(Box::new(inner))
}

impl Predicate {
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut parts) => {
                parts.push(other);
                Predicate::And(parts)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// Evaluate against an already upper-cased label.
    fn eval_upper(&self, upper: &str) -> bool {
        match self {
            Predicate::ContainsAny(keys) => keys.iter().any(|k| upper.contains(k)),
            Predicate::ContainsAll(keys) => keys.iter().all(|k| upper.contains(k)),
            Predicate::Not(inner) => !inner.eval_upper(upper),
            Predicate::And(parts) => parts.iter().all(|p| p.eval_upper(upper)),
        }
    }

    pub fn matches(&self, label: &str) -> bool {
        self.eval_upper(&label.to_uppercase())
    }
}

/// A rewrite: every label satisfying `predicate` becomes `label`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub predicate: Predicate,
    pub label: &'static str,
}

impl Rule {
    pub fn new(predicate: Predicate, label: &'static str) -> Self {
        Rule { predicate, label }
    }

    /// Rewrite `current` if it matches, otherwise hand it back untouched.
    pub fn apply(&self, current: String) -> String {
        if self.predicate.matches(&current) {
            self.label.to_string()
        } else {
            current
        }
    }
}

static STANDARD_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(
            contains_any(&["TSTM"]).and(not(contains_any(&["NON", "MARINE"]))),
            "THUNDERSTORM WIND",
        ),
        Rule::new(contains_any(&["MICROBURST"]), "THUNDERSTORM WIND"),
        Rule::new(
            contains_any(&["RIVER", "FLASH", "STREAM"]).and(contains_any(&["FLOOD", "FLD"])),
            "FLASH FLOOD",
        ),
        Rule::new(
            contains_any(&["STRONG WIND"]).and(not(contains_any(&["MARINE"]))),
            "STRONG WIND",
        ),
        Rule::new(contains_any(&["FIRE"]), "WILDFIRE"),
        Rule::new(
            contains_any(&["EXCESSIVE", "RECORD"]).and(contains_any(&["HEAT"])),
            "EXCESSIVE HEAT",
        ),
        Rule::new(contains_any(&["HEAT WAVE"]), "HEAT"),
        // Plain cold must not take "extreme cold"; the exclusion enforces it.
        Rule::new(
            contains_any(&["COLD", "CHILL"]).and(not(contains_any(&["EXTREME"]))),
            "COLD/WIND CHILL",
        ),
        Rule::new(
            contains_any(&["COLD", "CHILL"]).and(contains_any(&["EXTREME"])),
            "EXTREMECOLD/WIND CHILL",
        ),
        Rule::new(contains_any(&["RIP CURRENT"]), "RIP CURRENT"),
        Rule::new(contains_all(&["LAKE", "EFFECT", "SNOW"]), "LAKE-EFFECT SNOW"),
        Rule::new(
            contains_any(&["ROCK", "MUD", "LAND"]).and(contains_any(&["SLIDE"])),
            "DEBRIS FLOW",
        ),
        Rule::new(contains_any(&["HURRICANE", "TYPHOON"]), "HURRICANE (TYPHOON)"),
        Rule::new(contains_any(&["SURF"]), "HIGH SURF"),
        Rule::new(contains_any(&["FROST", "FREEZE"]), "FROST/FREEZE"),
        Rule::new(contains_any(&["SURGE"]), "STORM SURGE/TIDE"),
        Rule::new(
            contains_any(&["COASTAL"]).and(contains_any(&["FLOOD", "EROSION"])),
            "COASTAL FLOOD",
        ),
    ]
});

/// The seventeen documented rewrite rules, in evaluation order.
pub fn standard_rules() -> &'static [Rule] {
    &STANDARD_RULES
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    rules: &'a [Rule],
}

impl Default for Normalizer<'static> {
    fn default() -> Self {
        Normalizer::new(standard_rules())
    }
}

impl<'a> Normalizer<'a> {
    pub fn new(rules: &'a [Rule]) -> Self {
        Normalizer { rules }
    }

    /// Left fold of every rule over the label.
    pub fn apply(&self, raw: &str) -> String {
        self.rules
            .iter()
            .fold(raw.to_string(), |current, rule| rule.apply(current))
    }

    /// Rewrite `event_type` on every record in place.
    pub fn normalize_records(&self, records: &mut [StormRecord]) -> NormalizeReport {
        let distinct_before = distinct_count(records.iter().map(|r| r.event_type.as_str()));
        let mut rewritten = 0usize;
        for r in records.iter_mut() {
            let label = self.apply(&r.event_type);
            if label != r.event_type {
                rewritten += 1;
                r.event_type = label;
            }
        }
        let distinct_after = distinct_count(records.iter().map(|r| r.event_type.as_str()));
        debug!(distinct_before, distinct_after, rewritten, "normalized event types");
        NormalizeReport {
            distinct_before,
            distinct_after,
            rewritten,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeReport {
    pub distinct_before: usize,
    pub distinct_after: usize,
    pub rewritten: usize,
}

pub fn distinct_count<'a, I>(labels: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    labels.into_iter().collect::<HashSet<_>>().len()
}

/// Records per event type, most frequent first, ties by label.
pub fn label_counts(records: &[StormRecord]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.event_type.as_str()).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_event_type(raw: &str) -> String {
        Normalizer::default().apply(raw)
    }

    fn record(event_type: &str) -> StormRecord {
        StormRecord {
            state: "TX".to_string(),
            county_name: String::new(),
            event_type: event_type.to_string(),
            begin_date: None,
            reference_id: 1,
            fatalities: 0,
            injuries: 0,
            prop_dmg_magnitude: 0.0,
            prop_dmg_exp: String::new(),
            crop_dmg_magnitude: 0.0,
            crop_dmg_exp: String::new(),
            remarks: String::new(),
        }
    }

    // Raw spellings taken from the storm database.
    const RAW_SAMPLE: &[&str] = &[
        "TSTM WIND",
        "TSTM WIND/HAIL",
        "MARINE TSTM WIND",
        "NON-TSTM WIND",
        "DRY MICROBURST",
        "RIVER FLOOD",
        "FLASH FLOOD/FLOOD",
        "URBAN/SML STREAM FLD",
        "STRONG WINDS",
        "MARINE STRONG WIND",
        "WILD/FOREST FIRE",
        "RECORD HEAT",
        "EXCESSIVE HEAT",
        "HEAT WAVE",
        "COLD",
        "WIND CHILL",
        "EXTREME COLD",
        "EXTREME WINDCHILL",
        "RIP CURRENTS",
        "HEAVY LAKE EFFECT SNOW",
        "LANDSLIDE",
        "MUDSLIDES",
        "HURRICANE/TYPHOON",
        "TYPHOON",
        "HEAVY SURF/HIGH SURF",
        "FROST",
        "AGRICULTURAL FREEZE",
        "STORM SURGE",
        "COASTAL FLOODING/EROSION",
        "COASTAL EROSION",
        "EROSION",
        "TORNADO",
        "HAIL",
    ];

    #[test]
    fn test_rule_table_has_seventeen_rules() {
        assert_eq!(standard_rules().len(), 17);
    }

    #[test]
    fn test_marine_tstm_is_excluded() {
        assert_eq!(normalize_event_type("MARINE TSTM WIND"), "MARINE TSTM WIND");
        assert_eq!(normalize_event_type("NON-TSTM WIND"), "NON-TSTM WIND");
        assert_eq!(normalize_event_type("TSTM WIND"), "THUNDERSTORM WIND");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(normalize_event_type("tstm wind"), "THUNDERSTORM WIND");
        assert_eq!(normalize_event_type("Marine tstm wind"), "Marine tstm wind");
        assert_eq!(normalize_event_type("Heat Wave"), "HEAT");
    }

    #[test]
    fn test_compound_and_requires_both_sides() {
        assert_eq!(normalize_event_type("COASTAL EROSION"), "COASTAL FLOOD");
        assert_eq!(normalize_event_type("EROSION"), "EROSION");
        assert_eq!(normalize_event_type("COASTAL STORM"), "COASTAL STORM");
        assert_eq!(normalize_event_type("RIVER FLOOD"), "FLASH FLOOD");
        assert_eq!(normalize_event_type("URBAN/SML STREAM FLD"), "FLASH FLOOD");
        assert_eq!(normalize_event_type("FLOOD"), "FLOOD");
        assert_eq!(normalize_event_type("LAKE EFFECT SNOW"), "LAKE-EFFECT SNOW");
        assert_eq!(normalize_event_type("LAKE SNOW"), "LAKE SNOW");
    }

    #[test]
    fn test_extreme_cold_precedence() {
        assert_eq!(normalize_event_type("EXTREME COLD"), "EXTREMECOLD/WIND CHILL");
        assert_eq!(
            normalize_event_type("EXTREME COLD/WIND CHILL"),
            "EXTREMECOLD/WIND CHILL"
        );
        assert_eq!(normalize_event_type("COLD"), "COLD/WIND CHILL");
        assert_eq!(normalize_event_type("WIND CHILL"), "COLD/WIND CHILL");
    }

    #[test]
    fn test_record_cold_stays_with_plain_cold() {
        // Only "EXTREME" diverts cold spellings away from the plain bucket.
        assert_eq!(normalize_event_type("RECORD COLD"), "COLD/WIND CHILL");
    }

    #[test]
    fn test_thunderstorm_wind_is_not_strong_wind() {
        assert!(!standard_rules()[3].predicate.matches("THUNDERSTORM WIND"));
        assert_eq!(normalize_event_type("THUNDERSTORM WIND"), "THUNDERSTORM WIND");
    }

    #[test]
    fn test_rules_apply_cumulatively() {
        // Rule 3 takes this first; nothing later matches "FLASH FLOOD".
        assert_eq!(normalize_event_type("FLASH FLOOD/LANDSLIDE"), "FLASH FLOOD");
        // Rule 6 fires; the rewritten label no longer contains "HEAT WAVE".
        assert_eq!(normalize_event_type("RECORD HEAT WAVE"), "EXCESSIVE HEAT");
        // A later rule may rewrite an earlier rule's output.
        let rules = vec![
            Rule::new(contains_any(&["A"]), "B"),
            Rule::new(contains_any(&["B"]), "C"),
        ];
        assert_eq!(Normalizer::new(&rules).apply("A"), "C");
    }

    #[test]
    fn test_unmatched_passes_through() {
        assert_eq!(normalize_event_type("TORNADO"), "TORNADO");
        assert_eq!(normalize_event_type(""), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = Normalizer::default();
        for raw in RAW_SAMPLE {
            let once = normalizer.apply(raw);
            assert_eq!(normalizer.apply(&once), once, "label {raw:?}");
        }
        for rule in standard_rules() {
            assert_eq!(normalizer.apply(rule.label), rule.label);
        }
    }

    #[test]
    fn test_cardinality_never_increases() {
        let normalizer = Normalizer::default();
        let before = distinct_count(RAW_SAMPLE.iter().copied());
        let normalized: Vec<String> = RAW_SAMPLE.iter().map(|r| normalizer.apply(r)).collect();
        let after = distinct_count(normalized.iter().map(String::as_str));
        assert!(after <= before);
        assert!(after < before);
    }

    #[test]
    fn test_normalize_records_reports_counts() {
        let mut records: Vec<StormRecord> = ["TSTM WIND", "THUNDERSTORM WIND", "HAIL", "HAIL"]
            .iter()
            .map(|e| record(e))
            .collect();
        let report = Normalizer::default().normalize_records(&mut records);
        assert_eq!(
            report,
            NormalizeReport {
                distinct_before: 3,
                distinct_after: 2,
                rewritten: 1,
            }
        );
        assert_eq!(records[0].event_type, "THUNDERSTORM WIND");
    }

    #[test]
    fn test_label_counts_orders_by_frequency() {
        let records: Vec<StormRecord> = ["HAIL", "TORNADO", "HAIL", "FLOOD", "TORNADO", "HAIL"]
            .iter()
            .map(|e| record(e))
            .collect();
        assert_eq!(
            label_counts(&records),
            vec![
                ("HAIL".to_string(), 3),
                ("TORNADO".to_string(), 2),
                ("FLOOD".to_string(), 1),
            ]
        );
    }
}
