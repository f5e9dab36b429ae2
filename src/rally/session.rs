//! Guided selection flow: captain hero, skill, level, joiner count, then each
//! joiner's hero (skill) and level. One option id per transition.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{JoinerSkillRule, RallyConfig};
use crate::data::hero::{normalize_lookup, Hero, HeroCatalog, Skill};
use crate::error::RallyError;
use crate::rally::roster::{Role, Roster, SelectionEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum SessionState {
    AwaitingCaptainHero { slot: usize },
    AwaitingCaptainSkill { slot: usize },
    AwaitingCaptainLevel { slot: usize },
    AwaitingJoinerCount,
    AwaitingJoinerHero { index: usize },
    AwaitingJoinerSkill { index: usize },
    AwaitingJoinerLevel { index: usize },
    Finalized,
}

impl SessionState {
    pub const INITIAL: Self = Self::AwaitingCaptainHero { slot: 0 };
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingCaptainHero { slot } => write!(f, "choosing captain hero #{}", slot + 1),
            Self::AwaitingCaptainSkill { slot } => {
                write!(f, "choosing captain skill #{}", slot + 1)
            }
            Self::AwaitingCaptainLevel { slot } => {
                write!(f, "choosing captain skill level #{}", slot + 1)
            }
            Self::AwaitingJoinerCount => write!(f, "choosing joiner count"),
            Self::AwaitingJoinerHero { index } => write!(f, "choosing joiner #{} hero", index + 1),
            Self::AwaitingJoinerSkill { index } => {
                write!(f, "choosing joiner #{} skill", index + 1)
            }
            Self::AwaitingJoinerLevel { index } => {
                write!(f, "choosing joiner #{} skill level", index + 1)
            }
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// One selectable choice for the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOption {
    pub id: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Progress {
    state: SessionState,
    pending_hero: Option<String>,
    pending_skill: Option<String>,
    captains: Vec<SelectionEntry>,
    joiners: Vec<SelectionEntry>,
    joiner_count: Option<usize>,
}

impl Progress {
    fn initial() -> Self {
        Self {
            state: SessionState::INITIAL,
            pending_hero: None,
            pending_skill: None,
            captains: Vec::new(),
            joiners: Vec::new(),
            joiner_count: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionSession {
    catalog: Arc<HeroCatalog>,
    config: RallyConfig,
    progress: Progress,
    /// Snapshot taken before every accepted choice.
    history: Vec<Progress>,
}

impl SelectionSession {
    pub fn new(catalog: Arc<HeroCatalog>, config: RallyConfig) -> Self {
        Self {
            catalog,
            config,
            progress: Progress::initial(),
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.progress.state
    }

    pub fn is_finalized(&self) -> bool {
        self.progress.state == SessionState::Finalized
    }

    pub fn catalog(&self) -> &HeroCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &RallyConfig {
        &self.config
    }

    pub fn captains(&self) -> &[SelectionEntry] {
        &self.progress.captains
    }

    pub fn joiners(&self) -> &[SelectionEntry] {
        &self.progress.joiners
    }

    pub fn joiner_count(&self) -> Option<usize> {
        self.progress.joiner_count
    }

    /// Hero picked for the entry currently being configured.
    pub fn pending_hero(&self) -> Option<&Hero> {
        let name = self.progress.pending_hero.as_deref()?;
        self.catalog.hero(name).ok()
    }

    pub fn pending_skill(&self) -> Option<&Skill> {
        let skill = self.progress.pending_skill.as_deref()?;
        self.pending_hero()?.skill(skill)
    }

    /// Choices accepted by [Self::choose] in the current state.
    pub fn options(&self) -> Vec<SessionOption> {
        match self.progress.state {
            SessionState::AwaitingCaptainHero { slot } => {
                let multi = self.config.captain_heroes > 1;
                self.catalog
                    .all_heroes()
                    .iter()
                    .map(|hero| SessionOption {
                        id: hero.name.clone(),
                        label: hero.name.clone(),
                        description: if multi {
                            format!("Select {} as rally captain hero #{}", hero.name, slot + 1)
                        } else {
                            format!("Select {} as rally captain", hero.name)
                        },
                    })
                    .collect()
            }
            SessionState::AwaitingCaptainSkill { .. } => self
                .pending_hero()
                .map(|hero| hero.skills.iter().map(skill_option).collect())
                .unwrap_or_default(),
            SessionState::AwaitingJoinerSkill { .. } => self
                .pending_hero()
                .map(|hero| hero.joiner_skills().map(skill_option).collect())
                .unwrap_or_default(),
            SessionState::AwaitingCaptainLevel { .. } | SessionState::AwaitingJoinerLevel { .. } => {
                self.pending_skill()
                    .map(level_options)
                    .unwrap_or_default()
            }
            SessionState::AwaitingJoinerCount => (self.config.min_joiners
                ..=self.config.max_joiners)
                .map(|count| {
                    let plural = if count == 1 { "" } else { "s" };
                    SessionOption {
                        id: count.to_string(),
                        label: format!("{count} Joiner Hero{plural}"),
                        description: format!("Add {count} joiner hero{plural} to the rally"),
                    }
                })
                .collect(),
            SessionState::AwaitingJoinerHero { index } => self
                .catalog
                .all_heroes()
                .iter()
                .filter(|hero| hero.first_joiner_skill().is_some())
                .map(|hero| SessionOption {
                    id: hero.name.clone(),
                    label: hero.name.clone(),
                    description: format!("Select {} as joiner #{}", hero.name, index + 1),
                })
                .collect(),
            SessionState::Finalized => Vec::new(),
        }
    }

    /// Apply one choice. On error nothing changes.
    pub fn choose(&mut self, option_id: &str) -> Result<SessionState, RallyError> {
        let wanted = normalize_lookup(option_id);
        let Some(option) = self
            .options()
            .into_iter()
            .find(|option| normalize_lookup(&option.id) == wanted)
        else {
            return Err(RallyError::invalid(self.progress.state, option_id));
        };

        let mut next = self.progress.clone();
        self.advance(&mut next, &option.id)?;
        let previous = std::mem::replace(&mut self.progress, next);
        self.history.push(previous);
        Ok(self.progress.state)
    }

    /// Undo the most recent choice. Undoing a level pick removes the entry
    /// it completed and returns to that entry's level step.
    pub fn step_back(&mut self) -> Result<SessionState, RallyError> {
        if self.is_finalized() {
            return Err(RallyError::invalid(self.progress.state, "step back"));
        }
        let previous = self.history.pop().ok_or(RallyError::NothingToUndo)?;
        self.progress = previous;
        Ok(self.progress.state)
    }

    /// Start over from the captain pick.
    pub fn reset(&mut self) -> SessionState {
        self.progress = Progress::initial();
        self.history.clear();
        self.progress.state
    }

    /// The finished roster; only available once every pick is made.
    pub fn finalize(&self) -> Result<Roster, RallyError> {
        if !self.is_finalized() {
            return Err(RallyError::IncompleteRoster(format!(
                "session is still {}",
                self.progress.state
            )));
        }
        Ok(Roster::new(
            self.progress.captains.clone(),
            self.progress.joiners.clone(),
        ))
    }

    fn advance(&self, next: &mut Progress, id: &str) -> Result<(), RallyError> {
        match next.state {
            SessionState::AwaitingCaptainHero { slot } => {
                next.pending_hero = Some(id.to_string());
                next.pending_skill = None;
                next.state = SessionState::AwaitingCaptainSkill { slot };
            }
            SessionState::AwaitingCaptainSkill { slot } => {
                next.pending_skill = Some(id.to_string());
                next.state = SessionState::AwaitingCaptainLevel { slot };
            }
            SessionState::AwaitingCaptainLevel { slot } => {
                let entry = self.complete_entry(next, Role::Captain, id)?;
                next.captains.push(entry);
                next.state = if slot + 1 < self.config.captain_heroes {
                    SessionState::AwaitingCaptainHero { slot: slot + 1 }
                } else {
                    SessionState::AwaitingJoinerCount
                };
            }
            SessionState::AwaitingJoinerCount => {
                let count = id
                    .parse::<usize>()
                    .map_err(|_| RallyError::invalid(next.state, id))?;
                next.joiner_count = Some(count);
                next.state = if count == 0 {
                    SessionState::Finalized
                } else {
                    SessionState::AwaitingJoinerHero { index: 0 }
                };
            }
            SessionState::AwaitingJoinerHero { index } => {
                next.pending_hero = Some(id.to_string());
                next.pending_skill = None;
                match self.config.joiner_skill_rule {
                    JoinerSkillRule::FirstSkill => {
                        let hero = self.catalog.hero(id)?;
                        let skill = hero.first_joiner_skill().ok_or_else(|| {
                            RallyError::UnknownSkill {
                                hero: hero.name.clone(),
                                skill: "<first skill>".to_string(),
                            }
                        })?;
                        next.pending_skill = Some(skill.name.clone());
                        next.state = SessionState::AwaitingJoinerLevel { index };
                    }
                    JoinerSkillRule::AnySkill => {
                        next.state = SessionState::AwaitingJoinerSkill { index };
                    }
                }
            }
            SessionState::AwaitingJoinerSkill { index } => {
                next.pending_skill = Some(id.to_string());
                next.state = SessionState::AwaitingJoinerLevel { index };
            }
            SessionState::AwaitingJoinerLevel { index } => {
                let entry = self.complete_entry(next, Role::Joiner, id)?;
                next.joiners.push(entry);
                let count = next.joiner_count.unwrap_or(0);
                next.state = if index + 1 < count {
                    SessionState::AwaitingJoinerHero { index: index + 1 }
                } else {
                    SessionState::Finalized
                };
            }
            SessionState::Finalized => return Err(RallyError::invalid(next.state, id)),
        }
        Ok(())
    }

    fn complete_entry(
        &self,
        next: &mut Progress,
        role: Role,
        level_id: &str,
    ) -> Result<SelectionEntry, RallyError> {
        let level = level_id
            .parse::<u8>()
            .map_err(|_| RallyError::invalid(next.state, level_id))?;
        let (Some(hero), Some(skill)) = (next.pending_hero.take(), next.pending_skill.take())
        else {
            return Err(RallyError::invalid(next.state, level_id));
        };
        SelectionEntry::resolve(&self.catalog, role, &hero, &skill, level)
    }
}

fn skill_option(skill: &Skill) -> SessionOption {
    SessionOption {
        id: skill.name.clone(),
        label: skill.name.clone(),
        description: skill.effect.clone(),
    }
}

fn level_options(skill: &Skill) -> Vec<SessionOption> {
    skill
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| SessionOption {
            id: (index + 1).to_string(),
            label: format!("Level {}: +{value}%", index + 1),
            description: format!("{} +{value}%", skill.effect),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SelectionSession {
        let catalog = HeroCatalog::builtin().expect("built-in catalog should load");
        SelectionSession::new(Arc::new(catalog), RallyConfig::default())
    }

    #[test]
    fn rejected_choice_leaves_progress_untouched() {
        let mut session = session();
        session.choose("Chenko").expect("hero pick");
        let before = session.progress.clone();
        let history = session.history.len();

        assert!(session.choose("Exorcism").is_err());
        assert_eq!(session.progress, before);
        assert_eq!(session.history.len(), history);
    }

    #[test]
    fn level_options_follow_skill_table() {
        let mut session = session();
        session.choose("Amadeus").expect("hero pick");
        session.choose("Unrighteous Strike").expect("skill pick");
        let labels: Vec<String> = session.options().into_iter().map(|o| o.label).collect();
        assert_eq!(labels[0], "Level 1: +8%");
        assert_eq!(labels[4], "Level 5: +40%");
    }

    #[test]
    fn zero_value_skill_offers_a_single_level() {
        let mut session = session();
        session.choose("Jabel").expect("hero pick");
        session.choose("No Skill").expect("skill pick");
        let ids: Vec<String> = session.options().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["1".to_string()]);
    }
}
