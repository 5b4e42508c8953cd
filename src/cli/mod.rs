//! Command-line parsing for the salary band predictor.
//!
//! Parsing and dispatch are kept apart from the form logic: clap turns argv
//! into these structs, `app` decides what to do with them.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::tables::Category;
use crate::domain::{FallbackPolicy, FormDraft};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salary", version, about = "Data-science salary band predictor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fill in the form interactively and browse the results (default).
    Tui(ConnectionArgs),
    /// Submit one selection to the prediction endpoint and print the results.
    ///
    /// Fields not given as flags are asked for with a numbered picker.
    Predict(PredictArgs),
    /// Print the offline point-based estimate with a per-field breakdown.
    Score(SelectionArgs),
    /// List every reference table with codes, labels and weights.
    Tables,
}

/// Where to send predictions and what to do when that fails.
#[derive(Debug, Args, Clone, Default)]
pub struct ConnectionArgs {
    /// Prediction endpoint URL (overrides SALARY_API_ENDPOINT).
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Behavior when the endpoint fails (overrides SALARY_FALLBACK).
    #[arg(long, value_enum)]
    pub fallback: Option<FallbackPolicy>,
}

/// The seven form fields. Codes and labels are matched case-insensitively.
#[derive(Debug, Args, Clone, Default)]
pub struct SelectionArgs {
    /// Experience level (EN, MI, SE, EX).
    #[arg(short = 'e', long, value_parser = experience_code)]
    pub experience_level: Option<String>,

    /// Employment type (FT, PT, CT, FL).
    #[arg(short = 't', long, value_parser = employment_code)]
    pub employment_type: Option<String>,

    /// Job title, e.g. "Data Scientist".
    #[arg(short = 'j', long, value_parser = job_title)]
    pub job_title: Option<String>,

    /// Country you live in (US, GB, IN, CA, DE, ES, FR, NL, BR, AU).
    #[arg(short = 'r', long, value_parser = country_code)]
    pub employee_residence: Option<String>,

    /// Share of remote work: 0, 50 or 100.
    #[arg(short = 'w', long, value_parser = remote_ratio)]
    pub remote_ratio: Option<u32>,

    /// Country the company is based in.
    #[arg(short = 'l', long, value_parser = country_code)]
    pub company_location: Option<String>,

    /// Company size (S, M, L).
    #[arg(short = 's', long, value_parser = company_size)]
    pub company_size: Option<String>,

    /// Never prompt; fail if a field is missing.
    #[arg(long)]
    pub no_input: bool,
}

impl SelectionArgs {
    /// Draft holding exactly the fields given on the command line.
    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            experience_level: self.experience_level.clone(),
            employment_type: self.employment_type.clone(),
            job_title: self.job_title.clone(),
            employee_residence: self.employee_residence.clone(),
            remote_ratio: self.remote_ratio,
            company_location: self.company_location.clone(),
            company_size: self.company_size.clone(),
        }
    }
}

#[derive(Debug, Args, Clone, Default)]
pub struct PredictArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Also write the selection and predictions to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

fn resolve(category: Category, raw: &str) -> Result<String, String> {
    category.resolve_code(raw).ok_or_else(|| {
        format!(
            "unknown {} '{raw}' (run `salary tables` for the accepted values)",
            category.display_name()
        )
    })
}

fn experience_code(raw: &str) -> Result<String, String> {
    resolve(Category::ExperienceLevel, raw)
}

fn employment_code(raw: &str) -> Result<String, String> {
    resolve(Category::EmploymentType, raw)
}

fn job_title(raw: &str) -> Result<String, String> {
    resolve(Category::JobTitle, raw)
}

fn country_code(raw: &str) -> Result<String, String> {
    resolve(Category::Country, raw)
}

fn company_size(raw: &str) -> Result<String, String> {
    resolve(Category::CompanySize, raw)
}

fn remote_ratio(raw: &str) -> Result<u32, String> {
    resolve(Category::RemoteRatio, raw)?
        .parse()
        .map_err(|e| format!("invalid remote ratio '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_flags_canonicalize_codes() {
        let cli = Cli::try_parse_from([
            "salary",
            "predict",
            "-e",
            "se",
            "--employment-type",
            "full-time",
            "--job-title",
            "data scientist",
            "-r",
            "us",
            "-w",
            "100%",
            "-l",
            "Brasil",
            "-s",
            "l",
            "--fallback",
            "local",
        ])
        .unwrap();

        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let draft = args.selection.to_draft();
        let selection = draft.complete().unwrap();
        assert_eq!(selection.experience_level, "SE");
        assert_eq!(selection.employment_type, "FT");
        assert_eq!(selection.job_title, "Data Scientist");
        assert_eq!(selection.employee_residence, "US");
        assert_eq!(selection.remote_ratio, 100);
        assert_eq!(selection.company_location, "BR");
        assert_eq!(selection.company_size, "L");
        assert_eq!(args.connection.fallback, Some(FallbackPolicy::Local));
    }

    #[test]
    fn unknown_codes_are_rejected_at_parse_time() {
        let err = Cli::try_parse_from(["salary", "score", "--company-size", "XL"]).unwrap_err();
        assert!(err.to_string().contains("Tamanho da Empresa"));

        assert!(Cli::try_parse_from(["salary", "score", "-w", "75"]).is_err());
    }

    #[test]
    fn missing_flags_leave_fields_unset() {
        let cli = Cli::try_parse_from(["salary", "score", "-e", "EN", "--no-input"]).unwrap();
        let Command::Score(args) = cli.command else {
            panic!("expected score");
        };
        assert!(args.no_input);
        let draft = args.to_draft();
        assert_eq!(draft.experience_level.as_deref(), Some("EN"));
        assert_eq!(draft.missing_fields().len(), 6);
    }
}
