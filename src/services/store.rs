//! JSON file schedule store

use std::{io::ErrorKind, path::PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::{error::StoreError, state::Schedule};

/// Schedule store backed by a single JSON file holding an array of events
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the schedule. A missing file is an empty schedule, not an error.
    pub async fn load(&self) -> Result<Schedule, StoreError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No schedule file at {}, starting empty", self.path.display());
                return Ok(Schedule::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        let schedule: Schedule =
            serde_json::from_str(&data).map_err(|source| StoreError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;

        debug!("Read {} events from {}", schedule.len(), self.path.display());
        Ok(schedule)
    }

    /// Persist the schedule, creating parent directories as needed
    pub async fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let io_error = |source: std::io::Error| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let data = serde_json::to_string_pretty(schedule).map_err(|source| {
            StoreError::Malformed {
                path: self.path.display().to_string(),
                source,
            }
        })?;
        fs::write(&self.path, data).await.map_err(io_error)?;

        info!("Saved {} events to {}", schedule.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Event;

    #[tokio::test]
    async fn missing_file_is_empty_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("schedules.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[tokio::test]
    async fn saved_schedule_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("schedules.json"));
        let schedule = Schedule::from(vec![
            Event::new("Opening", 300),
            Event::new("Keynote", 2700),
            Event::new("Break", 600),
        ]);

        store.save(&schedule).await.unwrap();
        assert_eq!(store.load().await.unwrap(), schedule);
    }

    #[tokio::test]
    async fn reads_records_written_by_other_tools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json");
        std::fs::write(
            &path,
            r#"[{"title":"Work","duration":10,"id":"a1"},{"title":"Oops","duration":-20}]"#,
        )
        .unwrap();

        let schedule = JsonFileStore::new(&path).load().await.unwrap();
        assert_eq!(schedule.get(0), Some(&Event::new("Work", 10)));
        assert_eq!(schedule.get(1), Some(&Event::new("Oops", 0)));
    }

    #[tokio::test]
    async fn null_and_fractional_durations_keep_the_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json");
        std::fs::write(
            &path,
            r#"[{"title":"A","duration":null},{"title":"B","duration":90.5},{"title":"C","duration":5}]"#,
        )
        .unwrap();

        let schedule = JsonFileStore::new(&path).load().await.unwrap();
        assert_eq!(
            schedule.events(),
            &[Event::new("A", 0), Event::new("B", 0), Event::new("C", 5)]
        );
    }
}
