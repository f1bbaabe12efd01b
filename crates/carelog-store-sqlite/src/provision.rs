//! Care home and staff account provisioning.
//!
//! These rows sit beside the incident register; the register itself never
//! reads them.

use carelog_core::account::{CareHome, NewStaffAccount, StaffAccount};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawCareHome, RawStaffAccount, encode_dt},
  store::SqliteStore,
};

enum RawAddStaff {
  Created(RawStaffAccount),
  UsernameTaken,
  CareHomeNotFound,
}

fn username_exists(
  conn: &rusqlite::Connection,
  username: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM users WHERE username = ?1",
        rusqlite::params![username],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn insert_user(
  conn: &rusqlite::Connection,
  care_home_id: i64,
  account: &NewStaffAccount,
  created_at: &str,
) -> rusqlite::Result<RawStaffAccount> {
  conn.execute(
    "INSERT INTO users (care_home_id, username, password_hash, role, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      care_home_id,
      account.username,
      account.password_hash,
      account.role.as_str(),
      created_at,
    ],
  )?;
  Ok(RawStaffAccount {
    user_id:      conn.last_insert_rowid(),
    care_home_id,
    username:     account.username.clone(),
    role:         account.role.as_str().to_owned(),
    created_at:   created_at.to_owned(),
  })
}

impl SqliteStore {
  /// Create a care home together with its first account in one
  /// transaction. Nothing is written if the username is already taken.
  pub async fn onboard_care_home(
    &self,
    name: &str,
    account: NewStaffAccount,
  ) -> Result<(CareHome, StaffAccount)> {
    let name       = name.trim().to_owned();
    let username   = account.username.clone();
    let created_at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if username_exists(&tx, &account.username)? {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO care_homes (name, created_at) VALUES (?1, ?2)",
          rusqlite::params![name, created_at],
        )?;
        let home = RawCareHome {
          care_home_id: tx.last_insert_rowid(),
          name,
          created_at: created_at.clone(),
        };
        let user = insert_user(&tx, home.care_home_id, &account, &created_at)?;

        tx.commit()?;
        Ok(Some((home, user)))
      })
      .await?;

    let Some((home, user)) = raw else {
      return Err(Error::UsernameTaken(username));
    };
    let home = home.into_care_home()?;
    let user = user.into_account()?;
    tracing::info!(
      care_home_id = home.care_home_id,
      username = %user.username,
      "care home onboarded"
    );
    Ok((home, user))
  }

  /// Add an account to an existing care home.
  pub async fn add_staff(
    &self,
    care_home_id: i64,
    account: NewStaffAccount,
  ) -> Result<StaffAccount> {
    let username   = account.username.clone();
    let created_at = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let home_exists = tx
          .query_row(
            "SELECT 1 FROM care_homes WHERE care_home_id = ?1",
            rusqlite::params![care_home_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !home_exists {
          return Ok(RawAddStaff::CareHomeNotFound);
        }
        if username_exists(&tx, &account.username)? {
          return Ok(RawAddStaff::UsernameTaken);
        }

        let user = insert_user(&tx, care_home_id, &account, &created_at)?;
        tx.commit()?;
        Ok(RawAddStaff::Created(user))
      })
      .await?;

    match raw {
      RawAddStaff::Created(user) => {
        let user = user.into_account()?;
        tracing::info!(
          care_home_id,
          username = %user.username,
          role = user.role.as_str(),
          "staff account added"
        );
        Ok(user)
      }
      RawAddStaff::UsernameTaken => Err(Error::UsernameTaken(username)),
      RawAddStaff::CareHomeNotFound => Err(Error::CareHomeNotFound(care_home_id)),
    }
  }

  pub async fn get_care_home(&self, care_home_id: i64) -> Result<Option<CareHome>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT care_home_id, name, created_at
               FROM care_homes WHERE care_home_id = ?1",
              rusqlite::params![care_home_id],
              |row| {
                Ok(RawCareHome {
                  care_home_id: row.get(0)?,
                  name:         row.get(1)?,
                  created_at:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCareHome::into_care_home).transpose()
  }

  /// All accounts belonging to a care home, oldest first.
  pub async fn list_staff(&self, care_home_id: i64) -> Result<Vec<StaffAccount>> {
    let raws: Vec<RawStaffAccount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, care_home_id, username, role, created_at
           FROM users WHERE care_home_id = ?1
           ORDER BY user_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![care_home_id], |row| {
            Ok(RawStaffAccount {
              user_id:      row.get(0)?,
              care_home_id: row.get(1)?,
              username:     row.get(2)?,
              role:         row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStaffAccount::into_account).collect()
  }
}
