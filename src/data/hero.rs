//! Heroes, their expedition skills, and the effect group each hero stacks in.

use serde::{Deserialize, Serialize};

use crate::error::RallyError;

/// Heroes that share a group add their bonuses before the groups multiply.
pub type EffectGroup = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Display label of what the skill buffs, e.g. "Lethality Up".
    pub effect: String,
    /// Bonus percentage per level; index 0 is level 1.
    pub values: Vec<u32>,
    /// Only a rally captain may pick this skill.
    #[serde(default)]
    pub captain_only: bool,
}

impl Skill {
    pub fn max_level(&self) -> u8 {
        u8::try_from(self.values.len()).unwrap_or(u8::MAX)
    }

    /// Bonus percentage at a 1-based level.
    pub fn value_at(&self, level: u8) -> Option<u32> {
        let index = usize::from(level).checked_sub(1)?;
        self.values.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub effect_group: EffectGroup,
    pub skills: Vec<Skill>,
}

impl Hero {
    /// The skill a joiner brings when joiners are held to their first skill.
    pub fn first_joiner_skill(&self) -> Option<&Skill> {
        self.skills.iter().find(|skill| !skill.captain_only)
    }

    pub fn joiner_skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|skill| !skill.captain_only)
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        let wanted = normalize_lookup(name);
        self.skills
            .iter()
            .find(|skill| normalize_lookup(&skill.name) == wanted)
    }
}

/// Fixed hero table. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeroCatalog {
    heroes: Vec<Hero>,
}

impl HeroCatalog {
    pub fn new(heroes: Vec<Hero>) -> Self {
        Self { heroes }
    }

    /// All heroes in declaration order.
    pub fn all_heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    pub fn hero(&self, name: &str) -> Result<&Hero, RallyError> {
        let wanted = normalize_lookup(name);
        self.heroes
            .iter()
            .find(|hero| normalize_lookup(&hero.name) == wanted)
            .ok_or_else(|| RallyError::UnknownHero(name.to_string()))
    }

    /// Skills of a hero in their listed order.
    pub fn skills_of(&self, hero: &str) -> Result<&[Skill], RallyError> {
        self.hero(hero).map(|hero| hero.skills.as_slice())
    }

    pub fn skill(&self, hero: &str, skill: &str) -> Result<&Skill, RallyError> {
        let found = self.hero(hero)?;
        found.skill(skill).ok_or_else(|| RallyError::UnknownSkill {
            hero: found.name.clone(),
            skill: skill.to_string(),
        })
    }

    pub fn effect_group_of(&self, hero: &str) -> Result<EffectGroup, RallyError> {
        self.hero(hero).map(|hero| hero.effect_group)
    }
}

/// Normalize a name for lookup: lowercase, collapse spaces/underscores.
pub fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, values: &[u32], captain_only: bool) -> Skill {
        Skill {
            name: name.to_string(),
            effect: "Lethality Up".to_string(),
            values: values.to_vec(),
            captain_only,
        }
    }

    fn catalog() -> HeroCatalog {
        HeroCatalog::new(vec![Hero {
            name: "Jabel".to_string(),
            effect_group: 111,
            skills: vec![
                skill("No Skill", &[0], true),
                skill("Rally Flag", &[8, 16, 24, 32, 40], false),
            ],
        }])
    }

    #[test]
    fn value_at_is_one_based() {
        let s = skill("Hunter", &[5, 10, 15, 20, 25], false);
        assert_eq!(s.value_at(1), Some(5));
        assert_eq!(s.value_at(5), Some(25));
        assert_eq!(s.value_at(0), None);
        assert_eq!(s.value_at(6), None);
        assert_eq!(s.max_level(), 5);
    }

    #[test]
    fn lookups_ignore_case_and_underscores() {
        let catalog = catalog();
        assert_eq!(catalog.hero("jabel").map(|h| h.effect_group), Ok(111));
        assert_eq!(
            catalog.skill("JABEL", "rally_flag").map(|s| s.name.as_str()),
            Ok("Rally Flag")
        );
    }

    #[test]
    fn unknown_lookups_report_the_missing_name() {
        let catalog = catalog();
        assert_eq!(
            catalog.effect_group_of("Nobody"),
            Err(RallyError::UnknownHero("Nobody".to_string()))
        );
        assert_eq!(
            catalog.skill("Jabel", "Hunter"),
            Err(RallyError::UnknownSkill {
                hero: "Jabel".to_string(),
                skill: "Hunter".to_string()
            })
        );
    }

    #[test]
    fn first_joiner_skill_skips_captain_only_entries() {
        let catalog = catalog();
        let hero = catalog.hero("Jabel").expect("jabel exists");
        assert_eq!(
            hero.first_joiner_skill().map(|s| s.name.as_str()),
            Some("Rally Flag")
        );
        assert_eq!(hero.joiner_skills().count(), 1);
    }
}
