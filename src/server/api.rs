use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::RallyConfig;
use crate::data::hero::{Hero, HeroCatalog};
use crate::error::RallyError;
use crate::rally::{
    compute, prompt_for, Prompt, RallyResult, Roster, RosterSpec, SelectionEntry,
    SelectionSession, SessionState,
};
use crate::server::sessions::{SessionEntry, SessionRegistry};

/// Everything a request handler needs: the fixed catalog and config plus
/// the live sessions.
#[derive(Debug)]
pub struct AppContext {
    pub catalog: Arc<HeroCatalog>,
    pub config: RallyConfig,
    sessions: Mutex<SessionRegistry>,
}

impl AppContext {
    pub fn new(catalog: HeroCatalog, config: RallyConfig) -> Self {
        let timeout = Duration::from_secs(config.session_timeout_secs);
        Self {
            catalog: Arc::new(catalog),
            config,
            sessions: Mutex::new(SessionRegistry::new(timeout)),
        }
    }

    fn sessions(&self) -> Result<MutexGuard<'_, SessionRegistry>, ApiError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| ApiError::Internal(format!("lock poisoned: {e}")))?;
        guard.sweep_expired(Instant::now());
        Ok(guard)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Rally(#[from] RallyError),
    #[error("Session not found")]
    SessionNotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Parse(_) => (400, "Bad Request"),
            Self::Rally(RallyError::IncompleteRoster(_)) => (409, "Conflict"),
            Self::Rally(_) => (400, "Bad Request"),
            Self::SessionNotFound => (404, "Not Found"),
            Self::Internal(_) => (500, "Internal Server Error"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChooseRequest {
    pub option: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView<'a> {
    pub id: String,
    pub created_at: String,
    pub state: SessionState,
    pub prompt: Prompt,
    pub captains: &'a [SelectionEntry],
    pub joiners: &'a [SelectionEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RallyResult>,
}

#[derive(Debug, Clone, Serialize)]
struct HeroListItem<'a> {
    name: &'a str,
    effect_group: u32,
    skills: Vec<SkillListItem<'a>>,
}

#[derive(Debug, Clone, Serialize)]
struct SkillListItem<'a> {
    name: &'a str,
    effect: &'a str,
    values: &'a [u32],
    captain_only: bool,
}

impl<'a> From<&'a Hero> for HeroListItem<'a> {
    fn from(hero: &'a Hero) -> Self {
        Self {
            name: &hero.name,
            effect_group: hero.effect_group,
            skills: hero
                .skills
                .iter()
                .map(|skill| SkillListItem {
                    name: &skill.name,
                    effect: &skill.effect,
                    values: &skill.values,
                    captain_only: skill.captain_only,
                })
                .collect(),
        }
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "bearhunt-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn heroes_payload(context: &AppContext) -> Result<String, ApiError> {
    let heroes: Vec<HeroListItem<'_>> = context
        .catalog
        .all_heroes()
        .iter()
        .map(HeroListItem::from)
        .collect();
    to_json(&serde_json::json!({ "heroes": heroes }))
}

pub fn config_payload(context: &AppContext) -> Result<String, ApiError> {
    to_json(&context.config)
}

pub fn create_session_payload(context: &AppContext) -> Result<String, ApiError> {
    let mut sessions = context.sessions()?;
    let id = sessions.create(SelectionSession::new(
        Arc::clone(&context.catalog),
        context.config.clone(),
    ));
    let entry = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound)?;
    session_view(context, id, entry)
}

pub fn session_payload(context: &AppContext, id: &str) -> Result<String, ApiError> {
    with_session(context, id, |id, entry| session_view(context, id, entry))
}

pub fn choose_payload(context: &AppContext, id: &str, body: &str) -> Result<String, ApiError> {
    let request: ChooseRequest = serde_json::from_str(body)?;
    with_session(context, id, |id, entry| {
        let state = entry.session.choose(&request.option)?;
        if state == SessionState::Finalized {
            log::info!("session {id} completed");
        }
        session_view(context, id, entry)
    })
}

pub fn back_payload(context: &AppContext, id: &str) -> Result<String, ApiError> {
    with_session(context, id, |id, entry| {
        entry.session.step_back()?;
        session_view(context, id, entry)
    })
}

pub fn reset_payload(context: &AppContext, id: &str) -> Result<String, ApiError> {
    with_session(context, id, |id, entry| {
        entry.session.reset();
        session_view(context, id, entry)
    })
}

pub fn result_payload(context: &AppContext, id: &str) -> Result<String, ApiError> {
    with_session(context, id, |_, entry| {
        let roster = entry.session.finalize()?;
        let result = compute(&context.catalog, &context.config, &roster)?;
        to_json(&result)
    })
}

pub fn delete_session_payload(context: &AppContext, id: &str) -> Result<String, ApiError> {
    let id = parse_id(id)?;
    let mut sessions = context.sessions()?;
    sessions.remove(&id).ok_or(ApiError::SessionNotFound)?;
    to_json(&serde_json::json!({ "status": "ok", "removed": id.to_string() }))
}

/// Stateless calculation of a roster given by name.
pub fn calculate_payload(context: &AppContext, body: &str) -> Result<String, ApiError> {
    let spec: RosterSpec = serde_json::from_str(body)?;
    let roster = Roster::from_spec(&context.catalog, context.config.joiner_skill_rule, &spec)?;
    let result = compute(&context.catalog, &context.config, &roster)?;
    to_json(&result)
}

fn with_session<F>(context: &AppContext, id: &str, action: F) -> Result<String, ApiError>
where
    F: FnOnce(Uuid, &mut SessionEntry) -> Result<String, ApiError>,
{
    let id = parse_id(id)?;
    let mut sessions = context.sessions()?;
    let entry = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound)?;
    action(id, entry)
}

fn session_view(context: &AppContext, id: Uuid, entry: &SessionEntry) -> Result<String, ApiError> {
    let session = &entry.session;
    let result = if session.is_finalized() {
        Some(compute(&context.catalog, &context.config, &session.finalize()?)?)
    } else {
        None
    };
    to_json(&SessionView {
        id: id.to_string(),
        created_at: entry.created_at.to_rfc3339(),
        state: session.state(),
        prompt: prompt_for(session),
        captains: session.captains(),
        joiners: session.joiners(),
        result,
    })
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::SessionNotFound)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|err| ApiError::Internal(err.to_string()))
}
