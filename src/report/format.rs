//! Plain-text rendering for the terminal.
//!
//! Formatting lives here so the form and scoring code stay free of layout
//! concerns, and output changes stay local.

use crate::app::pipeline::Outcome;
use crate::app::session::{Notice, NoticeVariant};
use crate::data::tables::Category;
use crate::domain::{AlgorithmKey, Field, FormSelection, PredictionSource};
use crate::scoring::{SalaryBand, ScoreBreakdown};

/// Results view: one line per algorithm, then the selection it was based on.
pub fn format_results(outcome: &Outcome) -> String {
    let mut out = String::new();

    out.push_str("=== Resultado das Previsões ===\n");
    out.push_str(&format!("Fonte: {}\n\n", outcome.source.display_name()));

    let width = outcome
        .predictions
        .iter()
        .map(|(key, _)| key.display_name().chars().count())
        .max()
        .unwrap_or(0);

    for (key, value) in outcome.predictions.iter() {
        out.push_str(&format!(
            "{} {value} por ano\n",
            pad(key.display_name(), width)
        ));
    }

    out.push('\n');
    out.push_str(&format_selection(&outcome.selection));

    if outcome.source == PredictionSource::Remote {
        out.push('\n');
        out.push_str(&format_algorithm_notes(outcome));
    }

    out
}

/// "Suas Informações" block: field label and display value, request order.
pub fn format_selection(selection: &FormSelection) -> String {
    let mut out = String::new();
    out.push_str("Suas Informações:\n");

    let width = Field::ALL
        .iter()
        .map(|f| f.label().chars().count())
        .max()
        .unwrap_or(0);
    for field in Field::ALL {
        out.push_str(&format!(
            "  {} {}\n",
            pad(&format!("{}:", field.label()), width + 1),
            field.display_value(selection)
        ));
    }
    out
}

fn format_algorithm_notes(outcome: &Outcome) -> String {
    let mut out = String::new();
    out.push_str("Sobre os Algoritmos:\n");
    for (key, _) in outcome.predictions.iter() {
        if let AlgorithmKey::Known(algorithm) = key {
            out.push_str(&format!(
                "  {}: {}\n",
                algorithm.display_name(),
                algorithm.description()
            ));
        }
    }
    out
}

/// Per-field weights of the offline estimate.
pub fn format_breakdown(breakdown: &ScoreBreakdown) -> String {
    let mut out = String::new();
    out.push_str("=== Estimativa por pontuação ===\n");
    out.push_str(&format!("{:<24} {:<32} {:>6}\n", "campo", "valor", "pontos"));
    out.push_str(&format!("{:-<24} {:-<32} {:-<6}\n", "", "", ""));

    for row in &breakdown.fields {
        let marker = if row.matched { "" } else { "  (não encontrado)" };
        out.push_str(&format!(
            "{} {} {:>6}{marker}\n",
            pad(&truncate(row.field.label(), 24), 24),
            pad(&truncate(&row.value, 32), 32),
            row.weight
        ));
    }

    out.push('\n');
    out.push_str(&format!("Total: {} pontos\n", breakdown.total));
    out.push_str(&format!("Faixa estimada: {} por ano\n", breakdown.band.label()));
    out
}

/// Every reference table plus the score → band thresholds.
pub fn format_tables() -> String {
    let mut out = String::new();

    for category in Category::ALL {
        out.push_str(&format!("{}:\n", category.display_name()));
        let rows = category.rows();
        let width = rows.iter().map(|(code, _, _)| code.chars().count()).max().unwrap_or(0);
        for (code, label, weight) in rows {
            if code == label {
                out.push_str(&format!("  {} {weight}\n", pad(&code, width)));
            } else {
                out.push_str(&format!("  {} {weight}  {label}\n", pad(&code, width)));
            }
        }
        out.push('\n');
    }

    out.push_str("Faixas salariais:\n");
    for band in SalaryBand::ALL {
        let range = match band.score_range() {
            (low, Some(high)) => format!("{low}-{high}"),
            (low, None) => format!("{low}+"),
        };
        out.push_str(&format!("  {} {}\n", pad(&range, 5), band.label()));
    }

    out
}

/// One-line notice, prefixed when it is an error.
pub fn format_notice(notice: &Notice) -> String {
    let prefix = match notice.variant {
        NoticeVariant::Default => "",
        NoticeVariant::Destructive => "[!] ",
    };
    format!("{prefix}{}: {}", notice.title, notice.description)
}

// Pads by chars, so accented labels line up.
fn pad(s: &str, width: usize) -> String {
    format!("{s:<width$}")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
