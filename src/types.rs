use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Team identifier as issued by the host team service
pub type TeamId = i64;

/// Page name granting access to every dashboard of a plugin
pub const WILDCARD_PAGE: &str = "*";

/// Reserved team id selecting every stored permission
pub const ALL_TEAMS: TeamId = -1;

/// Delimiter used when persisting a page list as a single column
pub const PAGE_SEPARATOR: &str = ",";

// ============================================================================
// Permission record
// ============================================================================

/// A team's page-level grant on one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPermission {
    pub id: i64,
    pub team_id: TeamId,
    pub plugin_id: String,
    pub page_access: Vec<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub last_modified: DateTime<Utc>,
}

/// Team selection for permission listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamFilter {
    All,
    Team(TeamId),
}

impl From<TeamId> for TeamFilter {
    fn from(team_id: TeamId) -> Self {
        if team_id == ALL_TEAMS {
            TeamFilter::All
        } else {
            TeamFilter::Team(team_id)
        }
    }
}

// ============================================================================
// Page access codec
// ============================================================================

/// Join a page list into its stored column form
pub fn encode_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(PAGE_SEPARATOR)
}

/// Split a stored column back into page names, dropping empty fragments
pub fn decode_pages(encoded: &str) -> Vec<String> {
    encoded
        .split(PAGE_SEPARATOR)
        .filter(|page| !page.is_empty())
        .map(|page| page.to_string())
        .collect()
}
