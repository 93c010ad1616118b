use std::fmt;
use std::str::FromStr;

use poem_openapi::Enum;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Closed set of organizational roles.
///
/// Stored and transmitted by their display strings. Anything outside this set
/// is rejected wherever a role crosses a boundary (database, token, API body).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Enum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    #[serde(rename = "admin")]
    #[oai(rename = "admin")]
    Admin,

    #[sea_orm(string_value = "Corp FA")]
    #[serde(rename = "Corp FA")]
    #[oai(rename = "Corp FA")]
    CorpFa,

    #[sea_orm(string_value = "Direktur")]
    #[serde(rename = "Direktur")]
    #[oai(rename = "Direktur")]
    Director,

    #[sea_orm(string_value = "CEO")]
    #[serde(rename = "CEO")]
    #[oai(rename = "CEO")]
    Ceo,

    #[sea_orm(string_value = "CFO")]
    #[serde(rename = "CFO")]
    #[oai(rename = "CFO")]
    Cfo,

    #[sea_orm(string_value = "Sourcing dan Procurement")]
    #[serde(rename = "Sourcing dan Procurement")]
    #[oai(rename = "Sourcing dan Procurement")]
    Procurement,
}

/// Role given to directory accounts provisioned on first login.
pub const DEFAULT_DIRECTORY_ROLE: UserRole = UserRole::CorpFa;

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::Admin,
        UserRole::CorpFa,
        UserRole::Director,
        UserRole::Ceo,
        UserRole::Cfo,
        UserRole::Procurement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::CorpFa => "Corp FA",
            UserRole::Director => "Direktur",
            UserRole::Ceo => "CEO",
            UserRole::Cfo => "CFO",
            UserRole::Procurement => "Sourcing dan Procurement",
        }
    }

    /// Roles that take part in proposal review rounds.
    pub fn is_approver(&self) -> bool {
        matches!(self, UserRole::Director | UserRole::Ceo | UserRole::Cfo)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
