use crate::data::hero::EffectGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupContribution {
    pub group: EffectGroup,
    pub percent: u32,
}

impl GroupContribution {
    pub fn new(group: EffectGroup, percent: u32) -> Self {
        Self { group, percent }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupTotals {
    /// Additive sum of every contribution in the group.
    pub percent: u32,
    pub members: usize,
}

impl GroupTotals {
    pub fn apply(&mut self, percent: u32) {
        self.percent += percent;
        self.members += 1;
    }

    pub fn factor(self) -> f64 {
        1.0 + f64::from(self.percent) / 100.0
    }
}

/// Per-group accumulator. Groups keep the order in which they were first seen.
#[derive(Debug, Clone, Default)]
pub struct GroupStacking {
    totals: Vec<(EffectGroup, GroupTotals)>,
}

impl GroupStacking {
    pub fn new() -> Self {
        Self { totals: Vec::new() }
    }

    pub fn add(&mut self, contribution: GroupContribution) {
        match self
            .totals
            .iter_mut()
            .find(|(group, _)| *group == contribution.group)
        {
            Some((_, totals)) => totals.apply(contribution.percent),
            None => {
                let mut totals = GroupTotals::default();
                totals.apply(contribution.percent);
                self.totals.push((contribution.group, totals));
            }
        }
    }

    pub fn add_many<I>(&mut self, contributions: I)
    where
        I: IntoIterator<Item = GroupContribution>,
    {
        for contribution in contributions {
            self.add(contribution);
        }
    }

    pub fn totals_for(&self, group: EffectGroup) -> Option<GroupTotals> {
        self.totals
            .iter()
            .find(|(key, _)| *key == group)
            .map(|(_, totals)| *totals)
    }

    pub fn groups(&self) -> impl Iterator<Item = (EffectGroup, GroupTotals)> + '_ {
        self.totals.iter().copied()
    }

    pub fn group_count(&self) -> usize {
        self.totals.len()
    }

    /// Product of `1 + sum/100` across groups.
    pub fn multiplier(&self) -> f64 {
        self.totals
            .iter()
            .map(|(_, totals)| totals.factor())
            .product()
    }

    pub fn total_percent(&self) -> f64 {
        (self.multiplier() - 1.0) * 100.0
    }
}

pub fn aggregate_contributions<I>(contributions: I) -> GroupStacking
where
    I: IntoIterator<Item = GroupContribution>,
{
    let mut stacking = GroupStacking::new();
    stacking.add_many(contributions);
    stacking
}
