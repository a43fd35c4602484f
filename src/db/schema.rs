//! Database schema and migrations for treevault.
//!
//! Migrations are applied sequentially when the database is first opened or
//! upgraded; the `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    password    TEXT NOT NULL,           -- Argon2 hash
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_users_username_nocase ON users(username COLLATE NOCASE);
"#,
    // v2: file/folder tree
    r#"
CREATE TABLE nodes (
    id          TEXT PRIMARY KEY,        -- UUID v4
    name        TEXT NOT NULL,
    kind        TEXT NOT NULL CHECK (kind IN ('file', 'folder')),
    parent_id   TEXT,
    owner_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    data        BLOB,                    -- files only
    size        INTEGER,                 -- files only
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK ((kind = 'file' AND data IS NOT NULL AND size IS NOT NULL)
        OR (kind = 'folder' AND data IS NULL AND size IS NULL)),
    UNIQUE (id, owner_id),
    -- a parent must belong to the same owner
    FOREIGN KEY (parent_id, owner_id) REFERENCES nodes(id, owner_id)
);

CREATE INDEX idx_nodes_owner_parent ON nodes(owner_id, parent_id);
"#,
];
