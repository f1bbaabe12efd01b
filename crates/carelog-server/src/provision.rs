//! Credential handling for the `onboard` and `add-staff` commands.

use std::io::BufRead;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use carelog_core::account::{NewStaffAccount, StaffRole};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} is required")]
  Missing(&'static str),

  #[error("argon2 error: {0}")]
  Hash(String),

  #[error("failed to read password: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Read one line from `reader`, without its line ending or surrounding
/// whitespace.
pub fn read_password(mut reader: impl BufRead) -> Result<String> {
  let mut line = String::new();
  reader.read_line(&mut line)?;
  Ok(line.trim().to_string())
}

/// Hash `password` into an argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Check and hash the credentials for a new account.
pub fn new_account(
  username: &str,
  password: &str,
  role: StaffRole,
) -> Result<NewStaffAccount> {
  let username = username.trim();
  if username.is_empty() {
    return Err(Error::Missing("username"));
  }
  if password.is_empty() {
    return Err(Error::Missing("password"));
  }
  Ok(NewStaffAccount {
    username: username.to_string(),
    password_hash: hash_password(password)?,
    role,
  })
}

/// A care home name, trimmed; blank names are rejected.
pub fn care_home_name(name: &str) -> Result<&str> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::Missing("care home name"));
  }
  Ok(name)
}
