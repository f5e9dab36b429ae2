use std::collections::HashSet;
use std::fmt;

use crate::data::hero::{normalize_lookup, Hero, HeroCatalog};

pub const LEVEL_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }
}

/// Checks the invariants the session and calculator rely on.
pub fn validate_catalog(catalog: &HeroCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_names = HashSet::new();

    if catalog.is_empty() {
        report.push(ValidationSeverity::Error, "catalog", "no heroes defined");
    }

    for (index, hero) in catalog.all_heroes().iter().enumerate() {
        let context = if hero.name.trim().is_empty() {
            format!("hero[{index}]")
        } else {
            hero.name.clone()
        };

        if hero.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, &context, "hero name is empty");
        } else if !seen_names.insert(normalize_lookup(&hero.name)) {
            report.push(
                ValidationSeverity::Error,
                &context,
                format!("duplicate hero name '{}'", hero.name),
            );
        }

        validate_skills(hero, &context, &mut report);
    }

    let groups: HashSet<_> = catalog
        .all_heroes()
        .iter()
        .map(|hero| hero.effect_group)
        .collect();
    report.push(
        ValidationSeverity::Info,
        "catalog",
        format!(
            "{} heroes across {} effect groups",
            catalog.len(),
            groups.len()
        ),
    );

    report
}

fn validate_skills(hero: &Hero, context: &str, report: &mut ValidationReport) {
    if hero.skills.is_empty() {
        report.push(ValidationSeverity::Error, context, "hero has no skills");
        return;
    }
    if hero.first_joiner_skill().is_none() {
        report.push(
            ValidationSeverity::Warning,
            context,
            "every skill is captain-only; hero cannot join a rally",
        );
    }

    let mut seen_skills = HashSet::new();
    for skill in &hero.skills {
        let skill_context = format!("{context}/{}", skill.name);
        if skill.name.trim().is_empty() {
            report.push(ValidationSeverity::Error, &skill_context, "skill name is empty");
        } else if !seen_skills.insert(normalize_lookup(&skill.name)) {
            report.push(
                ValidationSeverity::Error,
                &skill_context,
                "duplicate skill name",
            );
        }

        let zero_skill = skill.values == [0];
        if skill.values.len() != LEVEL_COUNT && !zero_skill {
            report.push(
                ValidationSeverity::Error,
                &skill_context,
                format!(
                    "expected {LEVEL_COUNT} level values, found {}",
                    skill.values.len()
                ),
            );
        }
        if skill.values.windows(2).any(|pair| pair[1] < pair[0]) {
            report.push(
                ValidationSeverity::Error,
                &skill_context,
                format!("level values decrease: {:?}", skill.values),
            );
        }
        if skill.effect.trim().is_empty() {
            report.push(
                ValidationSeverity::Warning,
                &skill_context,
                "effect label is empty",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::hero::Skill;

    fn hero(name: &str, skills: Vec<Skill>) -> Hero {
        Hero {
            name: name.to_string(),
            effect_group: 1,
            skills,
        }
    }

    fn skill(name: &str, values: &[u32]) -> Skill {
        Skill {
            name: name.to_string(),
            effect: "Attack Up".to_string(),
            values: values.to_vec(),
            captain_only: false,
        }
    }

    #[test]
    fn well_formed_catalog_has_no_errors() {
        let catalog = HeroCatalog::new(vec![hero("Amane", vec![skill("Tri-Phalanx", &[5, 10, 15, 20, 25])])]);
        let report = validate_catalog(&catalog);
        assert!(!report.has_errors(), "{:?}", report.diagnostics);
    }

    #[test]
    fn flags_duplicates_short_tables_and_decreasing_values() {
        let catalog = HeroCatalog::new(vec![
            hero("Amane", vec![skill("Tri-Phalanx", &[5, 10, 15])]),
            hero(
                "amane",
                vec![
                    skill("Exorcism", &[10, 20, 15, 40, 50]),
                    skill("exorcism", &[10, 20, 30, 40, 50]),
                ],
            ),
        ]);
        let report = validate_catalog(&catalog);
        let messages: Vec<String> = report.errors().map(|d| d.message.clone()).collect();

        assert!(messages.iter().any(|m| m.contains("duplicate hero name")));
        assert!(messages.iter().any(|m| m.contains("expected 5 level values")));
        assert!(messages.iter().any(|m| m.contains("level values decrease")));
        assert!(messages.iter().any(|m| m == "duplicate skill name"));
    }

    #[test]
    fn single_zero_value_skill_is_accepted() {
        let mut no_skill = skill("No Skill", &[0]);
        no_skill.captain_only = true;
        let catalog = HeroCatalog::new(vec![hero(
            "Jabel",
            vec![no_skill, skill("Rally Flag", &[8, 16, 24, 32, 40])],
        )]);
        assert!(!validate_catalog(&catalog).has_errors());
    }

    #[test]
    fn captain_only_hero_is_a_warning() {
        let mut no_skill = skill("No Skill", &[0]);
        no_skill.captain_only = true;
        let catalog = HeroCatalog::new(vec![hero("Jabel", vec![no_skill])]);
        let report = validate_catalog(&catalog);
        assert!(!report.has_errors());
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.severity == ValidationSeverity::Warning));
    }
}
