use serde::{Deserialize, Serialize};

use crate::config::JoinerSkillRule;
use crate::data::hero::{normalize_lookup, HeroCatalog};
use crate::error::RallyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Captain,
    Joiner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captain => "captain",
            Self::Joiner => "joiner",
        }
    }
}

/// One participant's hero, skill, and level with the looked-up bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub role: Role,
    pub hero: String,
    pub skill: String,
    pub effect: String,
    pub level: u8,
    pub percent: u32,
}

impl SelectionEntry {
    /// Resolve a pick against the catalog, using the catalog's spelling of names.
    pub fn resolve(
        catalog: &HeroCatalog,
        role: Role,
        hero: &str,
        skill: &str,
        level: u8,
    ) -> Result<Self, RallyError> {
        let found = catalog.hero(hero)?;
        let found_skill = catalog.skill(hero, skill)?;
        if role == Role::Joiner && found_skill.captain_only {
            return Err(RallyError::invalid(
                format!("configuring a joiner {}", found.name),
                found_skill.name.clone(),
            ));
        }
        let percent = found_skill.value_at(level).ok_or_else(|| {
            RallyError::invalid(
                format!(
                    "choosing a level for {} (1-{})",
                    found_skill.name,
                    found_skill.max_level()
                ),
                level.to_string(),
            )
        })?;
        Ok(Self {
            role,
            hero: found.name.clone(),
            skill: found_skill.name.clone(),
            effect: found_skill.effect.clone(),
            level,
            percent,
        })
    }
}

/// Finalized rally: captain entries plus joiners in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    captains: Vec<SelectionEntry>,
    joiners: Vec<SelectionEntry>,
}

impl Roster {
    pub fn new(captains: Vec<SelectionEntry>, joiners: Vec<SelectionEntry>) -> Self {
        Self { captains, joiners }
    }

    pub fn captains(&self) -> &[SelectionEntry] {
        &self.captains
    }

    pub fn joiners(&self) -> &[SelectionEntry] {
        &self.joiners
    }

    /// Captains first, then joiners.
    pub fn entries(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.captains.iter().chain(self.joiners.iter())
    }

    pub fn len(&self) -> usize {
        self.captains.len() + self.joiners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a roster from a request body or roster file.
    pub fn from_spec(
        catalog: &HeroCatalog,
        rule: JoinerSkillRule,
        spec: &RosterSpec,
    ) -> Result<Self, RallyError> {
        let captains = spec
            .captains
            .iter()
            .map(|pick| pick.resolve(catalog, Role::Captain))
            .collect::<Result<Vec<_>, _>>()?;
        let joiners = spec
            .joiners
            .iter()
            .map(|pick| {
                let entry = pick.resolve(catalog, Role::Joiner)?;
                check_joiner_rule(catalog, rule, &entry)?;
                Ok(entry)
            })
            .collect::<Result<Vec<_>, RallyError>>()?;
        Ok(Self::new(captains, joiners))
    }
}

/// Serialized form of a roster: names and levels only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSpec {
    #[serde(default, alias = "captain")]
    pub captains: Vec<PickSpec>,
    #[serde(default)]
    pub joiners: Vec<PickSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickSpec {
    pub hero: String,
    /// Defaults to the hero's first skill usable in this role.
    #[serde(default)]
    pub skill: Option<String>,
    pub level: u8,
}

impl PickSpec {
    fn resolve(&self, catalog: &HeroCatalog, role: Role) -> Result<SelectionEntry, RallyError> {
        match &self.skill {
            Some(skill) => SelectionEntry::resolve(catalog, role, &self.hero, skill, self.level),
            None => {
                let hero = catalog.hero(&self.hero)?;
                let default_skill = match role {
                    Role::Captain => hero.skills.first(),
                    Role::Joiner => hero.first_joiner_skill(),
                };
                let skill = default_skill.ok_or_else(|| RallyError::UnknownSkill {
                    hero: hero.name.clone(),
                    skill: "<first skill>".to_string(),
                })?;
                SelectionEntry::resolve(catalog, role, &hero.name, &skill.name, self.level)
            }
        }
    }
}

fn check_joiner_rule(
    catalog: &HeroCatalog,
    rule: JoinerSkillRule,
    entry: &SelectionEntry,
) -> Result<(), RallyError> {
    if rule == JoinerSkillRule::AnySkill {
        return Ok(());
    }
    let hero = catalog.hero(&entry.hero)?;
    let allowed = hero
        .first_joiner_skill()
        .map_or(false, |skill| normalize_lookup(&skill.name) == normalize_lookup(&entry.skill));
    if allowed {
        Ok(())
    } else {
        Err(RallyError::invalid(
            format!("configuring a joiner {} (first skill only)", hero.name),
            entry.skill.clone(),
        ))
    }
}
