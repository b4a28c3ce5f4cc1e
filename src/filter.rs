use crate::types::StormRecord;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Reference number of the 2006 Napa flood entry whose property damage was
/// keyed in billions instead of millions.
pub const NAPA_OUTLIER_REFNUM: u64 = 605943;

/// Retention criteria for the analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Earliest begin date kept (inclusive). Full event-type coverage in the
    /// database starts in 1996.
    pub since: NaiveDateTime,
    pub excluded_ref: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            since: NaiveDate::from_ymd_opt(1996, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            excluded_ref: Some(NAPA_OUTLIER_REFNUM),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub input: usize,
    pub retained: usize,
    pub dropped_by_date: usize,
    pub dropped_excluded: usize,
    pub dropped_no_impact: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Keep,
    TooEarly,
    Excluded,
    NoImpact,
}

fn has_impact(r: &StormRecord) -> bool {
    r.fatalities > 0 || r.injuries > 0 || r.prop_dmg_magnitude > 0.0 || r.crop_dmg_magnitude > 0.0
}

impl FilterConfig {
    fn judge(&self, r: &StormRecord) -> Verdict {
        // Unparsed dates never satisfy the window.
        match r.begin_date {
            Some(d) if d >= self.since => {}
            _ => return Verdict::TooEarly,
        }
        if self.excluded_ref == Some(r.reference_id) {
            return Verdict::Excluded;
        }
        if !has_impact(r) {
            return Verdict::NoImpact;
        }
        Verdict::Keep
    }

    pub fn retains(&self, r: &StormRecord) -> bool {
        self.judge(r) == Verdict::Keep
    }

    /// Build the working subset. The input slice is left as loaded.
    pub fn apply(&self, records: &[StormRecord]) -> (Vec<StormRecord>, FilterReport) {
        let mut report = FilterReport {
            input: records.len(),
            ..FilterReport::default()
        };
        let mut kept = Vec::new();
        for r in records {
            if self.retains(r) {
                kept.push(r.clone());
                continue;
            }
            match self.judge(r) {
                Verdict::Keep => {}
                Verdict::TooEarly => report.dropped_by_date += 1,
                Verdict::Excluded => report.dropped_excluded += 1,
                Verdict::NoImpact => report.dropped_no_impact += 1,
            }
        }
        report.retained = kept.len();
        debug!(?report, "filtered records");
        (kept, report)
    }
}
