use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed SSH endpoint for the Bandit wargame.
pub const WARGAME_HOST: &str = "bandit.labs.overthewire.org";
pub const WARGAME_PORT: u16 = 2220;

/// Highest playable level; the level set is terminal once it exists.
pub const FINAL_LEVEL: LevelIndex = LevelIndex(33);

/// Publicly known credential seeded for level 0.
pub const BOOTSTRAP_CREDENTIAL: &str = "bandit0";

/// Trimmed credential lengths above this count as plausible captures.
/// An approximate length check, not validation against the actual login.
pub const PLAUSIBLE_CREDENTIAL_LEN: usize = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LevelIndex(pub i64);

impl LevelIndex {
    pub fn next(self) -> LevelIndex {
        LevelIndex(self.0 + 1)
    }

    /// Level 0 is the seeded origin and is protected from deletion.
    pub fn is_origin(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LevelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One wargame stage. An empty credential means "not yet captured";
/// a non-empty credential is the candidate password for the *next*
/// level's login, not this level's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub index: LevelIndex,
    pub credential: String,
}

impl Level {
    pub fn new(index: LevelIndex, credential: impl Into<String>) -> Self {
        Self {
            index,
            credential: credential.into(),
        }
    }

    /// The level every store starts from.
    pub fn origin() -> Self {
        Self::new(LevelIndex(0), BOOTSTRAP_CREDENTIAL)
    }

    pub fn captured(&self) -> bool {
        !self.credential.is_empty()
    }

    pub fn plausible_credential(&self) -> bool {
        self.credential.trim().len() > PLAUSIBLE_CREDENTIAL_LEN
    }

    pub fn login_hint(&self) -> LoginHint {
        LoginHint::for_level(self.index)
    }
}

/// Connection details derived from a level index; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginHint {
    pub username: String,
    pub host: String,
    pub port: u16,
}

impl LoginHint {
    pub fn for_level(index: LevelIndex) -> Self {
        Self {
            username: format!("bandit{index}"),
            host: WARGAME_HOST.to_string(),
            port: WARGAME_PORT,
        }
    }

    pub fn ssh_command(&self) -> String {
        format!("ssh {}@{} -p {}", self.username, self.host, self.port)
    }
}
