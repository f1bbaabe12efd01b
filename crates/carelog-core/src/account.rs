//! Care homes and staff accounts created by the provisioning commands.
//!
//! Incidents refer to a care home only loosely, by id; nothing in the
//! incident lifecycle checks these rows.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareHome {
  pub care_home_id: i64,
  pub name:         String,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
  Manager,
  Staff,
}

impl StaffRole {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Manager => "manager",
      Self::Staff => "staff",
    }
  }
}

impl FromStr for StaffRole {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "manager" => Ok(Self::Manager),
      "staff" => Ok(Self::Staff),
      other => Err(Error::UnknownValue {
        kind:  "staff role",
        value: other.to_owned(),
      }),
    }
  }
}

/// A login for a member of staff. The password hash is write-only and never
/// read back into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAccount {
  pub user_id:      i64,
  pub care_home_id: i64,
  pub username:     String,
  pub role:         StaffRole,
  pub created_at:   DateTime<Utc>,
}

/// Input for creating a [`StaffAccount`].
#[derive(Debug, Clone)]
pub struct NewStaffAccount {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          StaffRole,
}
