//! SQL schema for the carelog SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reporting columns are write-once. The only UPDATE ever issued against this
-- table sets the management columns, the status and the version together.
CREATE TABLE IF NOT EXISTS incidents (
    incident_id                   TEXT PRIMARY KEY,   -- CSI-YYYYMMDD-HHMMSS[-NN]
    care_home_id                  INTEGER,            -- loose; not a foreign key
    incident_date                 TEXT NOT NULL,      -- YYYY-MM-DD
    incident_time                 TEXT NOT NULL,      -- HH:MM:SS
    category                      TEXT NOT NULL,
    location                      TEXT NOT NULL,
    resident_identifier           TEXT NOT NULL,
    resident_dob                  TEXT,
    resident_room                 TEXT NOT NULL DEFAULT '',
    incident_account              TEXT NOT NULL,
    immediate_actions_taken       TEXT NOT NULL DEFAULT '',
    harm_injury_sustained         TEXT NOT NULL CHECK (harm_injury_sustained IN ('Yes', 'No')),
    harm_injury_details           TEXT NOT NULL DEFAULT '',
    individuals_services_informed TEXT NOT NULL DEFAULT '',   -- ', '-delimited
    severity                      TEXT NOT NULL,
    reported_by_name              TEXT NOT NULL,
    reported_by_role              TEXT NOT NULL,
    immediate_learning_actions    TEXT NOT NULL DEFAULT '',
    audit_integrity_confirmation  TEXT NOT NULL CHECK (audit_integrity_confirmation = 'Confirmed'),
    submitted_timestamp           TEXT NOT NULL,      -- RFC 3339 UTC, fixed width
    management_review_status      TEXT NOT NULL DEFAULT 'Pending',
    management_reviewer_name      TEXT NOT NULL DEFAULT '',
    management_reviewer_role      TEXT NOT NULL DEFAULT '',
    management_review_outcome     TEXT NOT NULL DEFAULT '',
    signoff_decision              TEXT NOT NULL DEFAULT '',
    signoff_timestamp             TEXT NOT NULL DEFAULT '',
    version                       INTEGER NOT NULL DEFAULT 1,
    -- Management columns are all blank (Pending) or all set (Completed).
    CHECK (
      (management_review_status = 'Pending'
        AND management_reviewer_name = '' AND management_reviewer_role = ''
        AND management_review_outcome = '' AND signoff_decision = ''
        AND signoff_timestamp = '')
      OR
      (management_review_status = 'Completed'
        AND management_reviewer_name != '' AND management_reviewer_role != ''
        AND management_review_outcome != '' AND signoff_decision != ''
        AND signoff_timestamp != '')
    )
);

-- Append-only: one row per successful review, including overwritten ones.
CREATE TABLE IF NOT EXISTS review_history (
    review_id         TEXT PRIMARY KEY,
    incident_id       TEXT NOT NULL REFERENCES incidents(incident_id),
    reviewer_name     TEXT NOT NULL,
    reviewer_role     TEXT NOT NULL,
    outcome           TEXT NOT NULL,
    decision          TEXT NOT NULL,
    signoff_timestamp TEXT NOT NULL,
    version           INTEGER NOT NULL,
    UNIQUE (incident_id, version)
);

CREATE TABLE IF NOT EXISTS care_homes (
    care_home_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    care_home_id  INTEGER NOT NULL REFERENCES care_homes(care_home_id),
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL CHECK (role IN ('manager', 'staff')),
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS incidents_submitted_idx ON incidents(submitted_timestamp);
CREATE INDEX IF NOT EXISTS incidents_status_idx    ON incidents(management_review_status);
CREATE INDEX IF NOT EXISTS incidents_severity_idx  ON incidents(severity);
CREATE INDEX IF NOT EXISTS review_history_idx      ON review_history(incident_id);

PRAGMA user_version = 1;
";
