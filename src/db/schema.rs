pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- summaries table
CREATE TABLE IF NOT EXISTS summaries (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- tools table
CREATE TABLE IF NOT EXISTS tools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    summary_id TEXT NOT NULL REFERENCES summaries(id),
    brand TEXT,
    name TEXT NOT NULL,
    type TEXT,
    UNIQUE(summary_id, name, brand, type)
);

CREATE INDEX IF NOT EXISTS idx_tools_summary_id ON tools(summary_id);
"#;
