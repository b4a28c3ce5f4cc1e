// Damage resolution: `PROPDMG`/`CROPDMG` hold a mantissa and the matching
// `*EXP` column holds a magnitude letter. Anything other than K, M or B
// (including blanks, digits, `+`, `?`, `H`) scales by one.
use crate::types::StormRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExponentCode {
    Thousand,
    Million,
    Billion,
    Unspecified,
}

impl ExponentCode {
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "K" | "k" => ExponentCode::Thousand,
            "M" | "m" => ExponentCode::Million,
            "B" | "b" => ExponentCode::Billion,
            _ => ExponentCode::Unspecified,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            ExponentCode::Thousand => 1_000.0,
            ExponentCode::Million => 1_000_000.0,
            ExponentCode::Billion => 1_000_000_000.0,
            ExponentCode::Unspecified => 1.0,
        }
    }
}

/// Absolute dollar value of `magnitude` scaled by `code`.
pub fn resolve(magnitude: f64, code: &str) -> f64 {
    magnitude * ExponentCode::parse(code).multiplier()
}

impl StormRecord {
    pub fn property_damage_value(&self) -> f64 {
        resolve(self.prop_dmg_magnitude, &self.prop_dmg_exp)
    }

    pub fn crop_damage_value(&self) -> f64 {
        resolve(self.crop_dmg_magnitude, &self.crop_dmg_exp)
    }

    pub fn combined_damage(&self) -> f64 {
        self.property_damage_value() + self.crop_damage_value()
    }

    pub fn combined_casualties(&self) -> u64 {
        u64::from(self.injuries) + u64::from(self.fatalities)
    }
}
