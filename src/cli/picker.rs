//! Interactive field picker.
//!
//! Kept separate from clap parsing:
//! - clap handles the fields given as flags
//! - the picker asks for the rest, one numbered list per field
//!
//! Input is either a number from the list or a code/label; `q` cancels.

use std::io::{self, BufRead, Write};

use crate::data::tables::Category;
use crate::domain::{Field, FormDraft};
use crate::error::{AppError, EXIT_INPUT};

/// How one line of input was understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Selected(String),
    Cancel,
    Invalid(String),
}

/// Interpret one line of input against a category's entries.
pub fn parse_choice(category: Category, input: &str) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Choice::Cancel;
    }

    let rows = category.rows();
    if let Ok(n) = input.parse::<usize>() {
        // Remote ratios are numeric codes too; "50" means the code, not item 50.
        if category == Category::RemoteRatio {
            if let Some(code) = category.resolve_code(input) {
                return Choice::Selected(code);
            }
        }
        if (1..=rows.len()).contains(&n) {
            return Choice::Selected(rows[n - 1].0.clone());
        }
        return Choice::Invalid(format!(
            "Invalid choice: {n}. Enter a number between 1 and {}.",
            rows.len()
        ));
    }

    match category.resolve_code(input) {
        Some(code) => Choice::Selected(code),
        None => Choice::Invalid(format!("Unknown value: '{input}'.")),
    }
}

/// Ask for one field on stdin/stdout.
pub fn prompt_for_field(field: Field) -> Result<String, AppError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_for_field_with(field, &mut input, &mut output)
}

/// Ask for one field using the given reader and writer.
pub fn prompt_for_field_with<R: BufRead, W: Write>(
    field: Field,
    input: &mut R,
    output: &mut W,
) -> Result<String, AppError> {
    let category = field.category();
    let rows = category.rows();
    let write_err = |e: io::Error| AppError::new(EXIT_INPUT, format!("Failed to write prompt: {e}"));

    writeln!(output, "{}:", field.label()).map_err(write_err)?;
    for (idx, (code, label, _)) in rows.iter().enumerate() {
        if code == label {
            writeln!(output, "{:>3}) {label}", idx + 1).map_err(write_err)?;
        } else {
            writeln!(output, "{:>3}) {label} [{code}]", idx + 1).map_err(write_err)?;
        }
    }

    loop {
        write!(output, "{} (1-{}, q to quit): ", field.placeholder(), rows.len()).map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                EXIT_INPUT,
                format!("No input received for {}. Pass it with --{}.", field.key(), flag_name(field)),
            ));
        }

        match parse_choice(category, &line) {
            Choice::Selected(code) => return Ok(code),
            Choice::Cancel => return Err(AppError::new(EXIT_INPUT, "Canceled.")),
            Choice::Invalid(msg) => writeln!(output, "{msg}").map_err(write_err)?,
        }
    }
}

/// Prompt for every missing field, in form order.
pub fn fill_missing(draft: &mut FormDraft) -> Result<(), AppError> {
    for field in Field::FORM_ORDER {
        if draft.missing_fields().contains(&field) {
            let code = prompt_for_field(field)?;
            draft.set(field, code);
        }
    }
    Ok(())
}

fn flag_name(field: Field) -> String {
    field.key().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_choice_by_number_code_and_label() {
        assert_eq!(parse_choice(Category::CompanySize, "2"), Choice::Selected("M".to_string()));
        assert_eq!(parse_choice(Category::CompanySize, "l"), Choice::Selected("L".to_string()));
        assert_eq!(
            parse_choice(Category::Country, "Reino Unido"),
            Choice::Selected("GB".to_string())
        );
        assert_eq!(parse_choice(Category::Country, "Q"), Choice::Cancel);
        assert!(matches!(parse_choice(Category::CompanySize, "9"), Choice::Invalid(_)));
        assert!(matches!(parse_choice(Category::CompanySize, "huge"), Choice::Invalid(_)));
    }

    #[test]
    fn remote_ratio_numbers_prefer_codes() {
        assert_eq!(parse_choice(Category::RemoteRatio, "50"), Choice::Selected("50".to_string()));
        assert_eq!(parse_choice(Category::RemoteRatio, "0"), Choice::Selected("0".to_string()));
        assert_eq!(parse_choice(Category::RemoteRatio, "2"), Choice::Selected("50".to_string()));
    }

    #[test]
    fn prompt_retries_until_valid() {
        let mut input = Cursor::new("12\nSE\n");
        let mut output = Vec::new();
        let code = prompt_for_field_with(Field::ExperienceLevel, &mut input, &mut output).unwrap();
        assert_eq!(code, "SE");

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Nível de Experiência:"));
        assert!(text.contains("  3) Senior-level [SE]"));
        assert!(text.contains("Invalid choice: 12."));
    }

    #[test]
    fn job_titles_are_listed_without_codes() {
        let mut input = Cursor::new("1\n");
        let mut output = Vec::new();
        let code = prompt_for_field_with(Field::JobTitle, &mut input, &mut output).unwrap();
        assert_eq!(code, "Data Scientist");
        assert!(String::from_utf8(output).unwrap().contains("  1) Data Scientist\n"));
    }

    #[test]
    fn eof_and_quit_are_errors() {
        let mut output = Vec::new();
        let err = prompt_for_field_with(Field::CompanySize, &mut Cursor::new(""), &mut output).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert!(err.to_string().contains("--company-size"));

        let err = prompt_for_field_with(Field::CompanySize, &mut Cursor::new("q\n"), &mut output).unwrap_err();
        assert_eq!(err.to_string(), "Canceled.");
    }
}
