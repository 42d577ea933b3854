// Team existence lookups used by the HTTP boundary
use async_trait::async_trait;
use std::collections::HashSet;

use crate::types::TeamId;

#[async_trait]
pub trait TeamDirectory: Send + Sync {
    async fn team_exists(&self, team_id: TeamId) -> bool;
}

/// Fixed set of known teams.
///
/// Without a configured set every positive id is accepted.
#[derive(Debug, Clone, Default)]
pub struct StaticTeamDirectory {
    teams: Option<HashSet<TeamId>>,
}

impl StaticTeamDirectory {
    pub fn new<I: IntoIterator<Item = TeamId>>(teams: I) -> Self {
        Self {
            teams: Some(teams.into_iter().collect()),
        }
    }

    pub fn permissive() -> Self {
        Self { teams: None }
    }

    pub fn from_config(known_teams: &[TeamId]) -> Self {
        if known_teams.is_empty() {
            Self::permissive()
        } else {
            Self::new(known_teams.iter().copied())
        }
    }
}

#[async_trait]
impl TeamDirectory for StaticTeamDirectory {
    async fn team_exists(&self, team_id: TeamId) -> bool {
        match &self.teams {
            Some(teams) => teams.contains(&team_id),
            None => team_id > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_teams_are_exclusive() {
        let directory = StaticTeamDirectory::new([2, 5]);
        assert!(directory.team_exists(2).await);
        assert!(!directory.team_exists(3).await);
    }

    #[tokio::test]
    async fn empty_config_accepts_positive_ids() {
        let directory = StaticTeamDirectory::from_config(&[]);
        assert!(directory.team_exists(41).await);
        assert!(!directory.team_exists(0).await);
        assert!(!directory.team_exists(-1).await);
    }
}
