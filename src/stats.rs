// stats.rs

use serde::Serialize;

use crate::history::TempRecord;

/// Figures derived from the record list. Never persisted, recomputed from
/// the full list on every load.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Stats {
    pub count: usize,
    /// Arithmetic mean, rounded to one decimal place.
    pub mean: f32,
    pub max: f32,
    pub min: f32,
}

/// Plain reduction over the records; all zeros for an empty list.
pub fn calc_stats(records: &[TempRecord]) -> Stats {
    if records.is_empty() {
        return Stats::default();
    }

    let mut sum = 0.0f32;
    let mut max = records[0].value;
    let mut min = records[0].value;
    for r in records {
        sum += r.value;
        max = f32::max(max, r.value);
        min = f32::min(min, r.value);
    }

    Stats {
        count: records.len(),
        mean: round1(sum / records.len() as f32),
        max,
        min,
    }
}

/// Round to one decimal place, the precision used for readings throughout.
pub fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// Display bands for a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TempBand {
    Cold,
    Pleasant,
    Warm,
    Hot,
}

impl TempBand {
    pub fn classify(value: f32) -> Self {
        if value < 18.0 {
            TempBand::Cold
        } else if value <= 25.0 {
            TempBand::Pleasant
        } else if value <= 30.0 {
            TempBand::Warm
        } else {
            TempBand::Hot
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TempBand::Cold => "cold",
            TempBand::Pleasant => "pleasant",
            TempBand::Warm => "warm",
            TempBand::Hot => "hot",
        }
    }
}


// EOF
