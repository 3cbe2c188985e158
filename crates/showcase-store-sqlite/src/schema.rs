//! SQL schema for the Showcase SQLite store.
//!
//! Executed once at connection startup. The collections are flat: no foreign
//! keys tie one table to another.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS user_profiles (
    user_id      TEXT PRIMARY KEY,
    email        TEXT NOT NULL,
    display_name TEXT NOT NULL,
    role         TEXT NOT NULL DEFAULT 'user',   -- 'admin' | 'moderator' | 'user'
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS credentials (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,          -- lowercased
    password_hash TEXT NOT NULL                  -- argon2 PHC string
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,                 -- SHA-256 hex of the bearer token
    user_id    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS submissions (
    submission_id TEXT PRIMARY KEY,
    owner_id      TEXT NOT NULL UNIQUE,
    owner_email   TEXT NOT NULL,
    full_name     TEXT NOT NULL,
    email         TEXT NOT NULL,
    github_url    TEXT NOT NULL,
    app_purpose   TEXT NOT NULL,
    linkedin_url  TEXT,
    twitter_url   TEXT,
    facebook_url  TEXT,
    instagram_url TEXT,
    website_url   TEXT,
    screenshots   TEXT NOT NULL DEFAULT '[]',    -- JSON array of blob keys
    interests     TEXT NOT NULL DEFAULT '[]',
    expertise     TEXT NOT NULL DEFAULT '[]',
    tech_stack    TEXT NOT NULL DEFAULT '[]',
    status        TEXT NOT NULL DEFAULT 'draft', -- 'draft' | 'submitted'
    placement     TEXT,                          -- 'first' | 'second' | 'third'
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id      TEXT PRIMARY KEY,
    category    TEXT NOT NULL,                   -- 'interests' | 'expertise' | 'tech_stack'
    name        TEXT NOT NULL,
    name_key    TEXT NOT NULL,                   -- lowercased name
    usage_count INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    UNIQUE (category, name_key)
);

CREATE TABLE IF NOT EXISTS applications (
    application_id TEXT PRIMARY KEY,
    kind           TEXT NOT NULL,                -- 'mentor' | 'mentee'
    owner_id       TEXT NOT NULL,
    owner_email    TEXT NOT NULL,
    details        TEXT NOT NULL,                -- JSON of the filed form
    resume         TEXT,
    status         TEXT NOT NULL DEFAULT 'pending',
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    UNIQUE (kind, owner_id)
);

CREATE INDEX IF NOT EXISTS submissions_status_idx  ON submissions(status);
CREATE INDEX IF NOT EXISTS submissions_created_idx ON submissions(created_at);
CREATE INDEX IF NOT EXISTS sessions_user_idx       ON sessions(user_id);

PRAGMA user_version = 1;
";
