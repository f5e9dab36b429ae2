//! Text shown to the user for each session state, and the final summary.

use std::fmt::Write as _;

use serde::Serialize;

use crate::rally::calculator::RallyResult;
use crate::rally::roster::{Role, SelectionEntry};
use crate::rally::session::{SelectionSession, SessionOption, SessionState};

pub const TITLE: &str = "Bear Hunt Rally Calculator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub title: String,
    pub description: String,
    pub placeholder: String,
    pub options: Vec<SessionOption>,
}

pub fn prompt_for(session: &SelectionSession) -> Prompt {
    let state = session.state();
    let mut lines = Vec::new();
    for (slot, captain) in session.captains().iter().enumerate() {
        lines.push(format!(
            "**Rally Captain{}:** {} ({}, +{}%)",
            slot_suffix(session, slot),
            captain.hero,
            captain.skill,
            captain.percent
        ));
    }

    let (title, placeholder) = match state {
        SessionState::AwaitingCaptainHero { slot } => {
            if slot == 0 {
                lines.push("Select your rally captain to begin:".to_string());
            } else {
                lines.push(format!("Select captain hero #{}:", slot + 1));
            }
            (TITLE.to_string(), "Choose your rally captain".to_string())
        }
        SessionState::AwaitingCaptainSkill { .. } => {
            push_pending(session, &mut lines);
            lines.push("Select your expedition skill:".to_string());
            (
                captain_title(session),
                "Choose expedition skill...".to_string(),
            )
        }
        SessionState::AwaitingCaptainLevel { .. } => {
            push_pending(session, &mut lines);
            lines.push("Now select the effect level:".to_string());
            (captain_title(session), "Choose effect level...".to_string())
        }
        SessionState::AwaitingJoinerCount => {
            lines.push("Captain ready! Now choose joiner heroes:".to_string());
            let config = session.config();
            (
                "Bear Hunt Rally Setup Complete!".to_string(),
                format!(
                    "How many joiner heroes? ({}-{} required)",
                    config.min_joiners, config.max_joiners
                ),
            )
        }
        SessionState::AwaitingJoinerHero { index } => {
            push_joiner_progress(session, &mut lines);
            lines.push(format!("Select joiner #{} hero:", index + 1));
            (
                "Bear Hunt Rally Configuration".to_string(),
                format!("Choose joiner hero #{}...", index + 1),
            )
        }
        SessionState::AwaitingJoinerSkill { index } => {
            push_joiner_progress(session, &mut lines);
            push_pending(session, &mut lines);
            lines.push(format!("Select joiner #{} expedition skill:", index + 1));
            (
                "Bear Hunt Rally Configuration".to_string(),
                "Choose expedition skill...".to_string(),
            )
        }
        SessionState::AwaitingJoinerLevel { .. } => {
            push_joiner_progress(session, &mut lines);
            push_pending(session, &mut lines);
            lines.push("Select skill level:".to_string());
            (
                "Bear Hunt Rally Configuration".to_string(),
                "Choose skill level...".to_string(),
            )
        }
        SessionState::Finalized => {
            push_joiner_progress(session, &mut lines);
            lines.push("All heroes configured.".to_string());
            (
                "Bear Hunt Rally Calculation".to_string(),
                "Calculate New Rally".to_string(),
            )
        }
    };

    Prompt {
        title,
        description: lines.join("\n"),
        placeholder,
        options: session.options(),
    }
}

/// Multi-line summary of a calculation.
pub fn render_result(result: &RallyResult) -> String {
    let mut out = String::new();
    let mut joiner_number = 0;
    for breakdown in &result.entries {
        push_entry_line(&mut out, &breakdown.entry, &mut joiner_number, "");
    }
    for breakdown in &result.excluded {
        push_entry_line(&mut out, &breakdown.entry, &mut joiner_number, " [not counted]");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Total Rally Size: {} heroes", result.rally_size());
    let _ = writeln!(out, "Rally Composition: {}", result.composition().join(", "));
    if !result.excluded.is_empty() {
        let dropped: Vec<&str> = result
            .excluded
            .iter()
            .map(|breakdown| breakdown.entry.hero.as_str())
            .collect();
        let _ = writeln!(
            out,
            "Not Counted (joiner cap): {} ({})",
            dropped.len(),
            dropped.join(", ")
        );
    }
    let _ = writeln!(
        out,
        "Total Rally Bonus: {:.1}% ({})",
        result.rounded_percent,
        result.tier.label()
    );
    let _ = write!(
        out,
        "Calculation Method: {} ({})",
        result.method.label(),
        result.method.detail()
    );
    out
}

fn push_entry_line(
    out: &mut String,
    entry: &SelectionEntry,
    joiner_number: &mut usize,
    suffix: &str,
) {
    let who = match entry.role {
        Role::Captain => "Rally Captain".to_string(),
        Role::Joiner => {
            *joiner_number += 1;
            format!("Joiner {joiner_number}")
        }
    };
    let _ = writeln!(
        out,
        "{who}: {} - {} L{} (+{}%){suffix}",
        entry.hero, entry.skill, entry.level, entry.percent
    );
}

fn slot_suffix(session: &SelectionSession, slot: usize) -> String {
    if session.config().captain_heroes > 1 {
        format!(" #{}", slot + 1)
    } else {
        String::new()
    }
}

fn captain_title(session: &SelectionSession) -> String {
    match session.pending_hero() {
        Some(hero) => format!("Rally Captain: {}", hero.name),
        None => TITLE.to_string(),
    }
}

fn push_pending(session: &SelectionSession, lines: &mut Vec<String>) {
    if let Some(hero) = session.pending_hero() {
        lines.push(format!("**Current Hero:** {}", hero.name));
    }
    if let Some(skill) = session.pending_skill() {
        lines.push(format!("**Expedition Skill:** {}", skill.name));
        lines.push(format!("**Effect:** {}", skill.effect));
    }
}

fn push_joiner_progress(session: &SelectionSession, lines: &mut Vec<String>) {
    if let Some(count) = session.joiner_count() {
        lines.push(format!(
            "**Joiners Configured:** {}/{count}",
            session.joiners().len()
        ));
    }
}
