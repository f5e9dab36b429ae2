//! Rally bonus: additive inside an effect group, multiplicative across groups.

use std::cmp::Reverse;

use serde::Serialize;

use crate::config::{RallyConfig, TierThresholds};
use crate::data::hero::{EffectGroup, HeroCatalog};
use crate::error::RallyError;
use crate::rally::roster::{Role, Roster, SelectionEntry};
use crate::rally::stacking::{GroupContribution, GroupStacking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    BelowOptimal,
    Good,
    Excellent,
}

impl Tier {
    /// `low` and `high` both count as Good.
    pub fn classify(total_percent: f64, thresholds: TierThresholds) -> Self {
        if total_percent < thresholds.low {
            Self::BelowOptimal
        } else if total_percent <= thresholds.high {
            Self::Good
        } else {
            Self::Excellent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BelowOptimal => "Below Optimal",
            Self::Good => "Good Setup",
            Self::Excellent => "Excellent!",
        }
    }

    /// RGB display color.
    pub fn color(&self) -> u32 {
        match self {
            Self::BelowOptimal => 0xff0000,
            Self::Good => 0xffa500,
            Self::Excellent => 0x00ff00,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    SimpleAddition,
    MultiplicativeStacking,
}

impl CalculationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SimpleAddition => "Simple Addition",
            Self::MultiplicativeStacking => "Multiplicative Stacking",
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            Self::SimpleAddition => "same hero types",
            Self::MultiplicativeStacking => "different hero types",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryBreakdown {
    #[serde(flatten)]
    pub entry: SelectionEntry,
    pub group: EffectGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupBreakdown {
    pub group: EffectGroup,
    pub percent: u32,
    pub factor: f64,
    pub heroes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RallyResult {
    pub total_percent: f64,
    /// `total_percent` rounded to one decimal place for display.
    pub rounded_percent: f64,
    pub multiplier: f64,
    pub tier: Tier,
    pub color: u32,
    pub method: CalculationMethod,
    /// Entries that count toward the bonus, in roster order.
    pub entries: Vec<EntryBreakdown>,
    /// Joiners dropped by the top-N cap, in roster order.
    pub excluded: Vec<EntryBreakdown>,
    pub groups: Vec<GroupBreakdown>,
}

impl RallyResult {
    /// Entries that count toward the bonus; capped joiners are left out.
    pub fn rally_size(&self) -> usize {
        self.entries.len()
    }

    /// Hero names of every counted entry.
    pub fn composition(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|breakdown| breakdown.entry.hero.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BonusCalculator<'a> {
    catalog: &'a HeroCatalog,
    config: &'a RallyConfig,
}

impl<'a> BonusCalculator<'a> {
    pub fn new(catalog: &'a HeroCatalog, config: &'a RallyConfig) -> Self {
        Self { catalog, config }
    }

    pub fn compute(&self, roster: &Roster) -> Result<RallyResult, RallyError> {
        self.check_complete(roster)?;

        let retained_joiners = retained_joiner_flags(roster.joiners(), self.config.joiner_cap);
        let flags = std::iter::repeat(true)
            .take(roster.captains().len())
            .chain(retained_joiners);

        let mut entries = Vec::with_capacity(roster.len());
        let mut excluded = Vec::new();
        for (entry, retained) in roster.entries().zip(flags) {
            let breakdown = self.breakdown(entry)?;
            if retained {
                entries.push(breakdown);
            } else {
                excluded.push(breakdown);
            }
        }

        let stacking = entries
            .iter()
            .fold(GroupStacking::new(), |mut stacking, breakdown| {
                stacking.add(GroupContribution::new(
                    breakdown.group,
                    breakdown.entry.percent,
                ));
                stacking
            });

        let (method, total_percent) = if stacking.group_count() <= 1 {
            let sum = stacking.groups().map(|(_, totals)| totals.percent).sum::<u32>();
            (CalculationMethod::SimpleAddition, f64::from(sum))
        } else {
            (
                CalculationMethod::MultiplicativeStacking,
                stacking.total_percent(),
            )
        };
        let tier = Tier::classify(total_percent, self.config.thresholds);

        let groups = stacking
            .groups()
            .map(|(group, totals)| GroupBreakdown {
                group,
                percent: totals.percent,
                factor: totals.factor(),
                heroes: entries
                    .iter()
                    .filter(|breakdown| breakdown.group == group)
                    .map(|breakdown| breakdown.entry.hero.clone())
                    .collect(),
            })
            .collect();

        log::debug!(
            "rally of {} entries: {} over {} group(s) = {total_percent:.3}%",
            entries.len(),
            method.label(),
            stacking.group_count()
        );

        Ok(RallyResult {
            total_percent,
            rounded_percent: round_one_decimal(total_percent),
            multiplier: 1.0 + total_percent / 100.0,
            tier,
            color: tier.color(),
            method,
            entries,
            excluded,
            groups,
        })
    }

    fn check_complete(&self, roster: &Roster) -> Result<(), RallyError> {
        let captains = roster.captains().len();
        if captains == 0 {
            return Err(RallyError::IncompleteRoster(
                "no rally captain selected".to_string(),
            ));
        }
        if captains < self.config.captain_heroes {
            return Err(RallyError::IncompleteRoster(format!(
                "{captains} of {} captain heroes selected",
                self.config.captain_heroes
            )));
        }
        let joiners = roster.joiners().len();
        if joiners < self.config.min_joiners {
            return Err(RallyError::IncompleteRoster(format!(
                "{joiners} joiner(s) selected, at least {} required",
                self.config.min_joiners
            )));
        }
        Ok(())
    }

    /// Re-checks the entry against the catalog: names, the captain-only
    /// flag, and the percent stored for its level.
    fn breakdown(&self, entry: &SelectionEntry) -> Result<EntryBreakdown, RallyError> {
        let group = self.catalog.effect_group_of(&entry.hero)?;
        let skill = self.catalog.skill(&entry.hero, &entry.skill)?;
        if entry.role == Role::Joiner && skill.captain_only {
            return Err(RallyError::invalid(
                format!("checking joiner {}", entry.hero),
                entry.skill.clone(),
            ));
        }
        if skill.value_at(entry.level) != Some(entry.percent) {
            return Err(RallyError::invalid(
                format!("checking {} {} L{}", entry.hero, entry.skill, entry.level),
                format!("+{}%", entry.percent),
            ));
        }
        Ok(EntryBreakdown {
            entry: entry.clone(),
            group,
        })
    }
}

/// Convenience wrapper over [BonusCalculator::compute].
pub fn compute(
    catalog: &HeroCatalog,
    config: &RallyConfig,
    roster: &Roster,
) -> Result<RallyResult, RallyError> {
    BonusCalculator::new(catalog, config).compute(roster)
}

/// One flag per joiner: true when it survives the top-N cap. Ties keep
/// roster order.
fn retained_joiner_flags(joiners: &[SelectionEntry], cap: Option<usize>) -> Vec<bool> {
    let Some(cap) = cap.filter(|cap| *cap < joiners.len()) else {
        return vec![true; joiners.len()];
    };
    let mut ranked: Vec<usize> = (0..joiners.len()).collect();
    ranked.sort_by_key(|&index| Reverse(joiners[index].percent));

    let mut flags = vec![false; joiners.len()];
    for &index in ranked.iter().take(cap) {
        flags[index] = true;
    }
    flags
}

/// Rounds like `{:.1}` display: exact ties go to the even digit, so 81.25
/// becomes 81.2.
pub fn round_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}
