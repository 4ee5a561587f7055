//! SQLite schema definition.

/// Complete database schema for the patient queue.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Departments (fixed set, seeded below)
-- ============================================================================

CREATE TABLE IF NOT EXISTS departments (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    position INTEGER NOT NULL,
    current_token INTEGER,
    next_token INTEGER,
    total_served INTEGER NOT NULL DEFAULT 0 CHECK (total_served >= 0),
    waiting_count INTEGER NOT NULL DEFAULT 0 CHECK (waiting_count >= 0),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO departments (id, name, position) VALUES ('general', 'General', 0);
INSERT OR IGNORE INTO departments (id, name, position) VALUES ('diagnostics', 'Diagnostics', 1);
INSERT OR IGNORE INTO departments (id, name, position) VALUES ('emergency', 'Emergency', 2);
INSERT OR IGNORE INTO departments (id, name, position) VALUES ('pharmacy', 'Pharmacy', 3);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    token_number INTEGER NOT NULL CHECK (token_number >= 1),
    name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age BETWEEN 1 AND 120),
    gender TEXT NOT NULL,
    department TEXT NOT NULL REFERENCES departments(name),
    visit_type TEXT NOT NULL,
    registration_time TEXT NOT NULL,              -- RFC 3339, nanosecond precision
    status TEXT NOT NULL DEFAULT 'Waiting',       -- Waiting, In Progress, Completed
    priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 3),
    is_emergency INTEGER NOT NULL,
    is_senior_citizen INTEGER NOT NULL,
    called_time TEXT,
    completion_time TEXT,
    UNIQUE (department, token_number)
);

CREATE INDEX IF NOT EXISTS idx_patients_department_status ON patients(department, status);
CREATE INDEX IF NOT EXISTS idx_patients_registration_time ON patients(registration_time);
"#;
