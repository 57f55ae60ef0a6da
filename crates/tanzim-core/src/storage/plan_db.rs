//! SQLite-based storage for qalib templates, day plans and the note book.
//!
//! A compiled day is persisted as "today's plan", distinct from the template
//! it was derived from: editing the plan never mutates the stored template.
//! The note book is stored one row per event name so countdown state
//! survives across days.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{data_dir, migrations};
use crate::error::{Diagnostic, Result};
use crate::recurrence::{NoteBook, SubtaskNote};
use crate::timeline::Timeline;

pub struct PlanDb {
    conn: Connection,
}

impl PlanDb {
    /// Open the plan database at `~/.config/tanzim/tanzim.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("tanzim.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        // Create base tables (v1 schema) first.
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS qawalib (
                name       TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS plans (
                date        TEXT PRIMARY KEY,
                timeline    TEXT NOT NULL,
                compiled_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                event_name TEXT PRIMARY KEY,
                notes      TEXT NOT NULL
            );",
        )?;
        migrations::migrate(&self.conn)
    }

    // === Templates ===

    /// Insert or replace a stored qalib by name.
    pub fn save_template(&self, name: &str, body: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO qawalib (name, body, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET body = ?2, updated_at = ?3",
            params![name, body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn load_template(&self, name: &str) -> Result<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM qawalib WHERE name = ?1",
                params![name],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    pub fn list_templates(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM qawalib ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
        Ok(names)
    }

    pub fn delete_template(&self, name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM qawalib WHERE name = ?1", params![name])?;
        Ok(deleted > 0)
    }

    // === Day plans ===

    /// Persist a compiled day together with its advisory diagnostics,
    /// replacing any previous plan for the same date.
    pub fn save_plan(
        &self,
        date: NaiveDate,
        timeline: &Timeline,
        diagnostics: &[Diagnostic],
    ) -> Result<()> {
        let timeline_json = serde_json::to_string(timeline)?;
        let diagnostics_json = serde_json::to_string(diagnostics)?;
        self.conn.execute(
            "INSERT INTO plans (date, timeline, compiled_at, diagnostics)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(date) DO UPDATE SET
                 timeline = ?2, compiled_at = ?3, diagnostics = ?4",
            params![
                date.to_string(),
                timeline_json,
                Utc::now().to_rfc3339(),
                diagnostics_json
            ],
        )?;
        Ok(())
    }

    pub fn load_plan(&self, date: NaiveDate) -> Result<Option<(Timeline, Vec<Diagnostic>)>> {
        let row = self
            .conn
            .query_row(
                "SELECT timeline, diagnostics FROM plans WHERE date = ?1",
                params![date.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        match row {
            Some((timeline_json, diagnostics_json)) => {
                let timeline = serde_json::from_str(&timeline_json)?;
                let diagnostics = serde_json::from_str(&diagnostics_json)?;
                Ok(Some((timeline, diagnostics)))
            }
            None => Ok(None),
        }
    }

    // === Note book ===

    /// Replace the stored note book with `notes`.
    pub fn save_notes(&self, notes: &NoteBook) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM notes", [])?;
        for (event_name, event_notes) in notes {
            tx.execute(
                "INSERT INTO notes (event_name, notes) VALUES (?1, ?2)",
                params![event_name, serde_json::to_string(event_notes)?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn load_notes(&self) -> Result<NoteBook> {
        let mut stmt = self.conn.prepare("SELECT event_name, notes FROM notes")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;

        let mut book = NoteBook::new();
        for (event_name, json) in rows {
            let event_notes: Vec<SubtaskNote> = serde_json::from_str(&json)?;
            book.insert(event_name, event_notes);
        }
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{CompiledEvent, EventKind};
    use chrono::Duration;

    fn sample_timeline() -> Timeline {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let wake = date.and_hms_opt(5, 0, 0).unwrap();
        Timeline {
            date,
            events: vec![
                CompiledEvent {
                    name: "Wake-up".into(),
                    kind: EventKind::Wakeup,
                    start: wake,
                    end: wake,
                    continuation: false,
                    notes: Vec::new(),
                },
                CompiledEvent {
                    name: "Study".into(),
                    kind: EventKind::Flexible,
                    start: wake,
                    end: wake + Duration::hours(24),
                    continuation: false,
                    notes: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn template_crud_round_trip() {
        let db = PlanDb::open_memory().unwrap();
        db.save_template("weekday", "05:00\n2 Study\n").unwrap();
        db.save_template("friday", "06:00\n1 Reading\n").unwrap();

        assert_eq!(
            db.load_template("weekday").unwrap().as_deref(),
            Some("05:00\n2 Study\n")
        );
        assert_eq!(db.list_templates().unwrap(), vec!["friday", "weekday"]);

        db.save_template("weekday", "05:30\n2 Study\n").unwrap();
        assert_eq!(
            db.load_template("weekday").unwrap().as_deref(),
            Some("05:30\n2 Study\n")
        );

        assert!(db.delete_template("friday").unwrap());
        assert!(!db.delete_template("friday").unwrap());
        assert!(db.load_template("friday").unwrap().is_none());
    }

    #[test]
    fn plan_round_trips_with_diagnostics() {
        let db = PlanDb::open_memory().unwrap();
        let timeline = sample_timeline();
        db.save_plan(timeline.date, &timeline, &[]).unwrap();

        let (loaded, diagnostics) = db.load_plan(timeline.date).unwrap().unwrap();
        assert_eq!(loaded, timeline);
        assert!(diagnostics.is_empty());
        assert!(db
            .load_plan(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn on_disk_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tanzim.db");
        let timeline = sample_timeline();

        {
            let db = PlanDb::open_at(&path).unwrap();
            db.save_template("weekday", "05:00\n2 Study\n").unwrap();
            db.save_plan(timeline.date, &timeline, &[]).unwrap();
        }

        // A second open runs the migrations again; they must be idempotent.
        let db = PlanDb::open_at(&path).unwrap();
        assert_eq!(
            db.load_template("weekday").unwrap().as_deref(),
            Some("05:00\n2 Study\n")
        );
        let (loaded, diagnostics) = db.load_plan(timeline.date).unwrap().unwrap();
        assert_eq!(loaded, timeline);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn note_book_round_trip() {
        let db = PlanDb::open_memory().unwrap();
        let mut book = NoteBook::new();
        book.insert(
            "Read (Science)".into(),
            vec![SubtaskNote::counted("ch. 4", 14)],
        );
        db.save_notes(&book).unwrap();
        assert_eq!(db.load_notes().unwrap(), book);

        // Saving again replaces, never merges.
        db.save_notes(&NoteBook::new()).unwrap();
        assert!(db.load_notes().unwrap().is_empty());
    }
}
