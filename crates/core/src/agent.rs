//! Agent domain type — the conversational persona entity.
//!
//! An agent is owned by a single user, addressed by a unique normalized
//! handle, and carries opaque persona text that is injected into every
//! answer regardless of tier. The persona is owner-mutable only.

use crate::error::{Error, Result};
use crate::handle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum persona length in characters. Enforced identically at every
/// entry point that sets persona text.
pub const PERSONA_MAX_CHARS: usize = 40_000;

/// Unique identifier for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversational agent and its persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent ID
    pub id: AgentId,

    /// Unique, normalized handle viewers address the agent by
    pub handle: String,

    /// Normalized handle of the user who owns this agent
    pub owner_handle: String,

    /// Owner-authored persona text, injected into every answer composition
    pub persona: String,

    /// When this agent was created
    pub created_at: DateTime<Utc>,

    /// When the persona was last updated
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Create a new agent. Handles are normalized; the persona is validated
    /// against [`PERSONA_MAX_CHARS`].
    pub fn new(
        agent_handle: &str,
        owner_handle: &str,
        persona: impl Into<String>,
    ) -> Result<Self> {
        let agent_handle = handle::required(agent_handle, "agent handle")?;
        let owner_handle = handle::required(owner_handle, "owner handle")?;
        let persona = persona.into();
        validate_persona(&persona)?;

        let now = Utc::now();
        Ok(Self {
            id: AgentId::new(),
            handle: agent_handle,
            owner_handle,
            persona,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `viewer_handle` is this agent's owner (normalized comparison).
    pub fn is_owner(&self, viewer_handle: &str) -> bool {
        handle::normalize(viewer_handle) == self.owner_handle
    }

    /// The view of this agent a given caller is entitled to: the persona is
    /// included only for the owner.
    pub fn summary_for(&self, viewer_handle: &str) -> AgentSummary {
        let persona = self
            .is_owner(viewer_handle)
            .then(|| self.persona.clone());
        AgentSummary {
            handle: self.handle.clone(),
            owner_handle: self.owner_handle.clone(),
            persona,
            created_at: self.created_at,
        }
    }
}

/// Persona length check, shared by agent creation and persona updates.
pub fn validate_persona(persona: &str) -> Result<()> {
    let chars = persona.chars().count();
    if chars > PERSONA_MAX_CHARS {
        return Err(Error::validation(format!(
            "persona is {chars} characters, maximum is {PERSONA_MAX_CHARS}"
        )));
    }
    Ok(())
}

/// What `lookupAgent` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    pub handle: String,
    pub owner_handle: String,

    /// Present only when the caller is the owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_handles() {
        let agent = Agent::new(" Luna ", "ALICE", "A moonlit confidante.").unwrap();
        assert_eq!(agent.handle, "luna");
        assert_eq!(agent.owner_handle, "alice");
    }

    #[test]
    fn empty_handle_rejected() {
        assert!(Agent::new("", "alice", "p").is_err());
        assert!(Agent::new("luna", "  ", "p").is_err());
    }

    #[test]
    fn persona_cap_is_exact() {
        let at_cap = "x".repeat(PERSONA_MAX_CHARS);
        assert!(validate_persona(&at_cap).is_ok());

        let over_cap = "x".repeat(PERSONA_MAX_CHARS + 1);
        let err = validate_persona(&over_cap).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn persona_cap_counts_chars_not_bytes() {
        // 40,000 multi-byte characters are within the cap.
        let persona = "é".repeat(PERSONA_MAX_CHARS);
        assert!(validate_persona(&persona).is_ok());
    }

    #[test]
    fn owner_check_is_case_insensitive() {
        let agent = Agent::new("luna", "alice", "p").unwrap();
        assert!(agent.is_owner("Alice"));
        assert!(agent.is_owner(" ALICE "));
        assert!(!agent.is_owner("bob"));
    }

    #[test]
    fn summary_hides_persona_from_non_owner() {
        let agent = Agent::new("luna", "alice", "secret persona").unwrap();
        assert!(agent.summary_for("bob").persona.is_none());
        assert_eq!(
            agent.summary_for("alice").persona.as_deref(),
            Some("secret persona")
        );
    }
}
