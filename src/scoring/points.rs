//! Point accumulation over the seven fields.

use crate::domain::{Field, FormSelection, PredictionResult};

use super::band::{SalaryBand, band_for_score};

/// Weight contributed by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldScore {
    pub field: Field,
    /// Display value of the selection for this field.
    pub value: String,
    /// Weight from the reference table, 0 on a lookup miss.
    pub weight: u32,
    /// Whether the value was found in its reference table.
    pub matched: bool,
}

/// Per-field weights plus the resulting total and band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub fields: Vec<FieldScore>,
    pub total: u32,
    pub band: SalaryBand,
}

/// Sum of the seven resolved weights.
pub fn score(selection: &FormSelection) -> u32 {
    Field::ALL
        .into_iter()
        .map(|field| field.resolve(selection).map(|e| e.weight).unwrap_or(0))
        .sum()
}

pub fn breakdown(selection: &FormSelection) -> ScoreBreakdown {
    let fields: Vec<FieldScore> = Field::ALL
        .into_iter()
        .map(|field| {
            let resolved = field.resolve(selection);
            FieldScore {
                field,
                value: field.display_value(selection),
                weight: resolved.map(|e| e.weight).unwrap_or(0),
                matched: resolved.is_some(),
            }
        })
        .collect();

    let total = fields.iter().map(|f| f.weight).sum();
    ScoreBreakdown {
        fields,
        total,
        band: band_for_score(total),
    }
}

/// Local estimate in the shape of a remote response: every algorithm gets the
/// band label derived from the score.
pub fn fallback_prediction(selection: &FormSelection) -> PredictionResult {
    PredictionResult::uniform(band_for_score(score(selection)).label())
}
