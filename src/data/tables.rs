//! Reference tables for the seven form fields.
//!
//! Each entry maps a wire code to the label shown to the user and the weight
//! the offline scorer adds for it. The tables are compile-time constants; a
//! lookup miss is reported as `None` and callers decide what that means
//! (weight 0 for scoring, raw value for display).

use serde::Serialize;

/// One selectable value of a categorical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceEntry<K: 'static = &'static str> {
    pub code: K,
    pub label: &'static str,
    pub weight: u32,
}

const fn entry(code: &'static str, label: &'static str, weight: u32) -> ReferenceEntry {
    ReferenceEntry { code, label, weight }
}

const fn title(name: &'static str, weight: u32) -> ReferenceEntry {
    ReferenceEntry {
        code: name,
        label: name,
        weight,
    }
}

pub static EXPERIENCE_LEVELS: [ReferenceEntry; 4] = [
    entry("EN", "Entry-level (Iniciante)", 1),
    entry("MI", "Mid-level (Intermediário)", 2),
    entry("SE", "Senior-level", 3),
    entry("EX", "Executive-level", 4),
];

pub static EMPLOYMENT_TYPES: [ReferenceEntry; 4] = [
    entry("FT", "Full-time", 4),
    entry("PT", "Part-time", 2),
    entry("CT", "Contract (Temporário)", 3),
    entry("FL", "Freelancer", 2),
];

/// Job titles use the title itself as the code.
pub static JOB_TITLES: [ReferenceEntry; 10] = [
    title("Data Scientist", 3),
    title("Machine Learning Engineer", 4),
    title("Data Engineer", 4),
    title("Data Analyst", 2),
    title("Research Scientist", 4),
    title("Data Architect", 4),
    title("Applied Scientist", 4),
    title("Business Intelligence Analyst", 2),
    title("AI Scientist", 4),
    title("ML Researcher", 3),
];

/// Shared by employee residence and company location.
pub static COUNTRIES: [ReferenceEntry; 10] = [
    entry("US", "Estados Unidos", 4),
    entry("GB", "Reino Unido", 3),
    entry("IN", "Índia", 1),
    entry("CA", "Canadá", 3),
    entry("DE", "Alemanha", 3),
    entry("ES", "Espanha", 2),
    entry("FR", "França", 3),
    entry("NL", "Holanda", 3),
    entry("BR", "Brasil", 1),
    entry("AU", "Austrália", 3),
];

pub static COMPANY_SIZES: [ReferenceEntry; 3] = [
    entry("S", "Small (< 50 funcionários)", 2),
    entry("M", "Medium (50-250 funcionários)", 3),
    entry("L", "Large (> 250 funcionários)", 4),
];

pub static REMOTE_RATIOS: [ReferenceEntry<u32>; 3] = [
    ReferenceEntry {
        code: 0,
        label: "Presencial (0% remoto)",
        weight: 2,
    },
    ReferenceEntry {
        code: 50,
        label: "Híbrido (50% remoto)",
        weight: 3,
    },
    ReferenceEntry {
        code: 100,
        label: "Totalmente remoto",
        weight: 4,
    },
];

/// Salary-range labels, lowest first. Also the labels the remote models emit
/// when they predict a band index.
pub static SALARY_RANGES: [&str; 6] = [
    "Até 50k",
    "50k–100k",
    "100k–150k",
    "150k–200k",
    "200k–300k",
    "Acima de 300k",
];

/// Exact-match lookup by code.
pub fn lookup<K, Q>(table: &'static [ReferenceEntry<K>], code: &Q) -> Option<&'static ReferenceEntry<K>>
where
    K: PartialEq<Q> + 'static,
    Q: ?Sized,
{
    table.iter().find(|e| e.code.eq(code))
}

pub fn remote_ratio(value: u32) -> Option<&'static ReferenceEntry<u32>> {
    lookup(&REMOTE_RATIOS, &value)
}

/// The reference tables, one per kind of value (countries serve two fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    Country,
    CompanySize,
    RemoteRatio,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::ExperienceLevel,
        Category::EmploymentType,
        Category::JobTitle,
        Category::Country,
        Category::CompanySize,
        Category::RemoteRatio,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Category::ExperienceLevel => "Nível de Experiência",
            Category::EmploymentType => "Tipo de Contratação",
            Category::JobTitle => "Cargo",
            Category::Country => "País",
            Category::CompanySize => "Tamanho da Empresa",
            Category::RemoteRatio => "Modalidade de Trabalho",
        }
    }

    /// Entries as `(code, label, weight)` with codes rendered as text.
    ///
    /// Remote ratios are the only numeric codes; everything else is borrowed.
    pub fn rows(self) -> Vec<(String, &'static str, u32)> {
        match self {
            Category::RemoteRatio => REMOTE_RATIOS
                .iter()
                .map(|e| (e.code.to_string(), e.label, e.weight))
                .collect(),
            _ => self
                .text_table()
                .iter()
                .map(|e| (e.code.to_string(), e.label, e.weight))
                .collect(),
        }
    }

    fn text_table(self) -> &'static [ReferenceEntry] {
        match self {
            Category::ExperienceLevel => &EXPERIENCE_LEVELS,
            Category::EmploymentType => &EMPLOYMENT_TYPES,
            Category::JobTitle => &JOB_TITLES,
            Category::Country => &COUNTRIES,
            Category::CompanySize => &COMPANY_SIZES,
            Category::RemoteRatio => &[],
        }
    }

    /// Canonicalize free-form input to a table code.
    ///
    /// Matches the code case-insensitively, then the label; for remote ratios a
    /// trailing `%` is accepted. Returns `None` when nothing matches.
    pub fn resolve_code(self, input: &str) -> Option<String> {
        let needle = input.trim();
        if needle.is_empty() {
            return None;
        }

        if self == Category::RemoteRatio {
            let digits = needle.trim_end_matches('%').trim();
            return digits
                .parse::<u32>()
                .ok()
                .and_then(remote_ratio)
                .map(|e| e.code.to_string());
        }

        let table = self.text_table();
        table
            .iter()
            .find(|e| e.code.eq_ignore_ascii_case(needle))
            .or_else(|| table.iter().find(|e| e.label.eq_ignore_ascii_case(needle)))
            .map(|e| e.code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_weights() -> Vec<u32> {
        Category::ALL
            .iter()
            .flat_map(|c| c.rows().into_iter().map(|(_, _, w)| w))
            .collect()
    }

    #[test]
    fn weights_stay_in_range() {
        for w in all_weights() {
            assert!((1..=4).contains(&w), "weight {w} out of range");
        }
    }

    #[test]
    fn table_cardinality_is_fixed() {
        assert_eq!(Category::ExperienceLevel.rows().len(), 4);
        assert_eq!(Category::EmploymentType.rows().len(), 4);
        assert_eq!(Category::JobTitle.rows().len(), 10);
        assert_eq!(Category::Country.rows().len(), 10);
        assert_eq!(Category::CompanySize.rows().len(), 3);
        assert_eq!(Category::RemoteRatio.rows().len(), 3);
        assert_eq!(SALARY_RANGES.len(), 6);
    }

    #[test]
    fn lookup_hits_and_misses() {
        assert_eq!(lookup(&EXPERIENCE_LEVELS, &"SE").map(|e| e.weight), Some(3));
        assert_eq!(lookup(&COUNTRIES, &"BR").map(|e| e.label), Some("Brasil"));
        assert!(lookup(&COUNTRIES, &"PT").is_none());
        // Lookups are exact; case folding only happens in `resolve_code`.
        assert!(lookup(&COMPANY_SIZES, &"l").is_none());
        assert_eq!(remote_ratio(50).map(|e| e.weight), Some(3));
        assert!(remote_ratio(25).is_none());
    }

    #[test]
    fn codes_are_unique_within_each_table() {
        for category in Category::ALL {
            let rows = category.rows();
            for (i, (code, _, _)) in rows.iter().enumerate() {
                assert!(
                    rows.iter().skip(i + 1).all(|(other, _, _)| other != code),
                    "duplicate code {code} in {}",
                    category.display_name()
                );
            }
        }
    }

    #[test]
    fn resolve_code_accepts_codes_labels_and_percentages() {
        assert_eq!(Category::ExperienceLevel.resolve_code("se"), Some("SE".to_string()));
        assert_eq!(Category::Country.resolve_code("brasil"), Some("BR".to_string()));
        assert_eq!(
            Category::JobTitle.resolve_code("machine learning engineer"),
            Some("Machine Learning Engineer".to_string())
        );
        assert_eq!(Category::RemoteRatio.resolve_code("50%"), Some("50".to_string()));
        assert_eq!(Category::RemoteRatio.resolve_code("75"), None);
        assert_eq!(Category::CompanySize.resolve_code("  "), None);
        assert_eq!(Category::CompanySize.resolve_code("XL"), None);
    }
}
