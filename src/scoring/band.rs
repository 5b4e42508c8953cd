//! Score → salary band mapping.

use serde::Serialize;

use crate::data::tables::SALARY_RANGES;

/// Upper inclusive bound of every band but the last.
const THRESHOLDS: [u32; 5] = [8, 12, 15, 17, 19];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryBand {
    UpTo50k,
    From50kTo100k,
    From100kTo150k,
    From150kTo200k,
    From200kTo300k,
    Above300k,
}

impl SalaryBand {
    pub const ALL: [SalaryBand; 6] = [
        SalaryBand::UpTo50k,
        SalaryBand::From50kTo100k,
        SalaryBand::From100kTo150k,
        SalaryBand::From150kTo200k,
        SalaryBand::From200kTo300k,
        SalaryBand::Above300k,
    ];

    /// Position in ascending order (0 = lowest).
    pub fn index(self) -> usize {
        match self {
            SalaryBand::UpTo50k => 0,
            SalaryBand::From50kTo100k => 1,
            SalaryBand::From100kTo150k => 2,
            SalaryBand::From150kTo200k => 3,
            SalaryBand::From200kTo300k => 4,
            SalaryBand::Above300k => 5,
        }
    }

    pub fn label(self) -> &'static str {
        SALARY_RANGES[self.index()]
    }

    /// Inclusive score range covered by this band; the top band is open.
    pub fn score_range(self) -> (u32, Option<u32>) {
        let i = self.index();
        let low = if i == 0 { 0 } else { THRESHOLDS[i - 1] + 1 };
        (low, THRESHOLDS.get(i).copied())
    }
}

/// Bucket a total score. Total over `u32`.
pub fn band_for_score(points: u32) -> SalaryBand {
    THRESHOLDS
        .iter()
        .position(|&upper| points <= upper)
        .map(|i| SalaryBand::ALL[i])
        .unwrap_or(SalaryBand::Above300k)
}
