//! SQLite-backed persistence for projects, evaluations, and weight state.
//!
//! Document-style storage: full records serialize to JSON in TEXT columns,
//! with keys and query columns broken out alongside. The weight-learning
//! state lives in a single constrained row so the learning step can update
//! it atomically.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::{CoreError, DatabaseError};
use crate::project::Project;
use crate::report::Evaluation;
use crate::weights::{learn, EvaluationSample, WeightVector, LEARNING_WINDOW};

use super::data_dir;

/// The persisted weight-learning state.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightState {
    /// Current base vector, replaced by each learning step.
    pub base: WeightVector,
    /// Evaluations run so far; attenuates exploration noise.
    pub projects_evaluated: u32,
    /// Terminal-evaluation history feeding the learning step.
    pub samples: Vec<EvaluationSample>,
}

impl Default for WeightState {
    fn default() -> Self {
        WeightState {
            base: WeightVector::balanced(),
            projects_evaluated: 0,
            samples: Vec::new(),
        }
    }
}

fn corrupt(what: impl Into<String>, err: serde_json::Error) -> DatabaseError {
    DatabaseError::CorruptRecord {
        what: what.into(),
        message: err.to_string(),
    }
}

/// SQLite database for project and evaluation storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `data_dir()/foreplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("foreplan.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database, used by tests.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS projects (
                    id          TEXT PRIMARY KEY,
                    name        TEXT NOT NULL UNIQUE,
                    body        TEXT NOT NULL,
                    created_at  TEXT NOT NULL,
                    updated_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS evaluations (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_id   TEXT NOT NULL,
                    evaluated_at TEXT NOT NULL,
                    risk         REAL NOT NULL,
                    status       TEXT NOT NULL,
                    body         TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS weight_state (
                    id                 INTEGER PRIMARY KEY CHECK (id = 1),
                    base               TEXT NOT NULL,
                    projects_evaluated INTEGER NOT NULL DEFAULT 0,
                    samples            TEXT NOT NULL DEFAULT '[]'
                );

                CREATE INDEX IF NOT EXISTS idx_evaluations_project_id
                    ON evaluations(project_id, id);
            "})
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // === Project CRUD ===

    /// Insert or replace a project, keyed by id.
    pub fn save_project(&self, project: &Project) -> Result<(), DatabaseError> {
        let body = serde_json::to_string(project)
            .map_err(|e| corrupt(format!("project '{}'", project.name), e))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO projects (id, name, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id.to_string(),
                project.name,
                body,
                project.created_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load a project by name.
    pub fn load_project(&self, name: &str) -> Result<Project, DatabaseError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM projects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let body = body.ok_or_else(|| DatabaseError::NotFound {
            what: format!("project '{name}'"),
        })?;
        serde_json::from_str(&body).map_err(|e| corrupt(format!("project '{name}'"), e))
    }

    /// All projects, oldest first.
    pub fn list_projects(&self) -> Result<Vec<Project>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM projects ORDER BY created_at, name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut projects = Vec::new();
        for row in rows {
            let body = row?;
            projects.push(serde_json::from_str(&body).map_err(|e| corrupt("stored project", e))?);
        }
        Ok(projects)
    }

    /// Delete a project and its evaluations in a single transaction.
    pub fn delete_project(&self, name: &str) -> Result<(), DatabaseError> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM projects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        let id = id.ok_or_else(|| DatabaseError::NotFound {
            what: format!("project '{name}'"),
        })?;

        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            self.conn.execute(
                "DELETE FROM evaluations WHERE project_id = ?1",
                params![id],
            )?;
            self.conn
                .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err.into())
            }
        }
    }

    // === Evaluation records ===

    /// Append an evaluation record, returning its row id.
    pub fn record_evaluation(&self, evaluation: &Evaluation) -> Result<i64, DatabaseError> {
        let body = serde_json::to_string(evaluation).map_err(|e| corrupt("evaluation", e))?;
        self.conn.execute(
            "INSERT INTO evaluations (project_id, evaluated_at, risk, status, body)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                evaluation.project_id.to_string(),
                evaluation.evaluated_at.to_rfc3339(),
                evaluation.risk,
                evaluation.status.as_str(),
                body,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Recorded evaluations for a project, newest first.
    pub fn evaluations_for(
        &self,
        project_id: Uuid,
        limit: u32,
    ) -> Result<Vec<Evaluation>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT body FROM evaluations WHERE project_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![project_id.to_string(), limit], |row| {
            row.get::<_, String>(0)
        })?;

        let mut evaluations = Vec::new();
        for row in rows {
            let body = row?;
            evaluations
                .push(serde_json::from_str(&body).map_err(|e| corrupt("stored evaluation", e))?);
        }
        Ok(evaluations)
    }

    /// The most recent evaluation for a project, if any.
    pub fn latest_evaluation(&self, project_id: Uuid) -> Result<Option<Evaluation>, DatabaseError> {
        Ok(self.evaluations_for(project_id, 1)?.into_iter().next())
    }

    // === Weight state ===

    /// Current weight state, creating the balanced default row on first read.
    pub fn weight_state(&self) -> Result<WeightState, DatabaseError> {
        self.ensure_weight_row()?;
        self.read_weight_state()
    }

    /// Append a terminal-evaluation sample and run the learning step when
    /// the window fills. Returns the possibly-updated state.
    ///
    /// The sample append and any base replacement land together or not at
    /// all.
    pub fn record_outcome(&self, sample: EvaluationSample) -> Result<WeightState, DatabaseError> {
        self.ensure_weight_row()?;
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<WeightState, DatabaseError> = (|| {
            let mut state = self.read_weight_state()?;
            state.samples.push(sample);
            if state.samples.len() % LEARNING_WINDOW == 0 {
                let window = &state.samples[state.samples.len() - LEARNING_WINDOW..];
                state.base = learn(&state.base, window);
            }
            self.write_weight_state(&state)?;
            Ok(state)
        })();
        match result {
            Ok(state) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(state)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    /// Count one more evaluation run, returning the new total.
    pub fn bump_projects_evaluated(&self) -> Result<u32, DatabaseError> {
        self.ensure_weight_row()?;
        self.conn.execute(
            "UPDATE weight_state SET projects_evaluated = projects_evaluated + 1 WHERE id = 1",
            [],
        )?;
        let count = self.conn.query_row(
            "SELECT projects_evaluated FROM weight_state WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Put the weight state back to the balanced default.
    pub fn reset_weight_state(&self) -> Result<WeightState, DatabaseError> {
        self.ensure_weight_row()?;
        let state = WeightState::default();
        self.write_weight_state(&state)?;
        Ok(state)
    }

    fn ensure_weight_row(&self) -> Result<(), DatabaseError> {
        let base = serde_json::to_string(&WeightVector::balanced())
            .map_err(|e| corrupt("weight state base", e))?;
        self.conn.execute(
            "INSERT OR IGNORE INTO weight_state (id, base, projects_evaluated, samples)
             VALUES (1, ?1, 0, '[]')",
            params![base],
        )?;
        Ok(())
    }

    fn read_weight_state(&self) -> Result<WeightState, DatabaseError> {
        let (base_json, projects_evaluated, samples_json): (String, u32, String) =
            self.conn.query_row(
                "SELECT base, projects_evaluated, samples FROM weight_state WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
        Ok(WeightState {
            base: serde_json::from_str(&base_json)
                .map_err(|e| corrupt("weight state base", e))?,
            projects_evaluated,
            samples: serde_json::from_str(&samples_json)
                .map_err(|e| corrupt("weight state samples", e))?,
        })
    }

    fn write_weight_state(&self, state: &WeightState) -> Result<(), DatabaseError> {
        let base =
            serde_json::to_string(&state.base).map_err(|e| corrupt("weight state base", e))?;
        let samples = serde_json::to_string(&state.samples)
            .map_err(|e| corrupt("weight state samples", e))?;
        self.conn.execute(
            "UPDATE weight_state SET base = ?1, projects_evaluated = ?2, samples = ?3 WHERE id = 1",
            params![base, state.projects_evaluated, samples],
        )?;
        Ok(())
    }
}
