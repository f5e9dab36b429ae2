//! Bear Hunt rally bonus calculator.
//!
//! [data] holds the hero catalog, [rally] the selection session and the
//! bonus calculator, and [server]/[cli] are the hosting surfaces.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod rally;
pub mod server;

pub use config::{JoinerSkillRule, RallyConfig, TierThresholds};
pub use data::hero::{EffectGroup, Hero, HeroCatalog, Skill};
pub use error::RallyError;
pub use rally::{
    compute, BonusCalculator, CalculationMethod, RallyResult, Roster, SelectionEntry,
    SelectionSession, SessionState, Tier,
};
