pub mod calculator;
pub mod prompt;
pub mod roster;
pub mod session;
pub mod stacking;

pub use calculator::{
    compute, round_one_decimal, BonusCalculator, CalculationMethod, EntryBreakdown,
    GroupBreakdown, RallyResult, Tier,
};
pub use prompt::{prompt_for, render_result, Prompt};
pub use roster::{PickSpec, Role, Roster, RosterSpec, SelectionEntry};
pub use session::{SelectionSession, SessionOption, SessionState};
pub use stacking::{aggregate_contributions, GroupContribution, GroupStacking, GroupTotals};
