//! Configuration for the group-creation screen core.
//!
//! All fields have defaults. A host may override any subset from JSON:
//!
//! ```json
//! { "roster": { "resubscribe_delay_ms": 1000 }, "labels": { "subtitle": "Online" } }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::store::{OrderDirection, RosterQuery};

// ─── Roster ──────────────────────────────────────────────────────────────────

/// Live roster subscription settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Field the `users` query is ordered by.
    pub order_key: String,
    pub direction: OrderDirection,
    /// Wait between a feed interruption and the next resubscribe attempt.
    #[serde(rename = "resubscribe_delay_ms", with = "duration_ms")]
    pub resubscribe_delay: Duration,
    /// Consecutive failed resubscribes before the subscription gives up.
    pub max_resubscribe_attempts: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            order_key: "name".to_string(),
            direction: OrderDirection::Ascending,
            resubscribe_delay: Duration::from_millis(500),
            max_resubscribe_attempts: 5,
        }
    }
}

impl RosterConfig {
    pub fn query(&self) -> RosterQuery {
        RosterQuery {
            order_key: self.order_key.clone(),
            direction: self.direction,
        }
    }
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// User-visible strings derived by the core and handed to presentation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Row title for a user with neither name nor email.
    pub no_identity: String,
    /// Row subtitle for every selectable user.
    pub subtitle: String,
    pub empty_roster: String,
    pub group_name_placeholder: String,
    pub empty_name_title: String,
    pub empty_name_message: String,
    pub write_failed_title: String,
    pub write_failed_message: String,
    pub acknowledge: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            no_identity: "~ No Name or Email ~".to_string(),
            subtitle: "User status".to_string(),
            empty_roster: "No users registered".to_string(),
            group_name_placeholder: "Enter a name for the group".to_string(),
            empty_name_title: "Error".to_string(),
            empty_name_message: "Please enter a name for the group before creating it."
                .to_string(),
            write_failed_title: "Error".to_string(),
            write_failed_message: "The group could not be created. Please try again."
                .to_string(),
            acknowledge: "OK".to_string(),
        }
    }
}

// ─── Top level ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
    pub roster: RosterConfig,
    pub labels: Labels,
}

impl GroupsConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
