//! Health check utilities for pathway.
//!
//! Provides the `doctor` command functionality:
//! - Database connection check
//! - Applied migrations and reference data version
//! - Row counts for the learning tables

use std::path::Path;

use anyhow::Result;

use crate::LearningStore;
use crate::db::{SEED_VERSION, latest_version};

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Health status for a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Component is healthy
    Ok,
    /// Component has a warning but is functional
    Warning(String),
    /// Component is not functional
    Error(String),
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }
}

/// Database health information.
#[derive(Debug)]
pub struct DatabaseHealth {
    pub status: HealthStatus,
    pub file_path: String,
}

/// Migration tracking information.
#[derive(Debug)]
pub struct MigrationInfo {
    pub version: u32,
    pub description: String,
    pub applied_at: i64,
}

/// Reference data version compared with the one this build ships.
#[derive(Debug)]
pub struct SeedHealth {
    pub status: HealthStatus,
    pub stored: u32,
    pub expected: u32,
}

/// Row counts for doctor output.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub topics: i64,
    pub study_materials: i64,
    pub assessment_questions: i64,
    pub user_profiles: i64,
    pub user_progress: i64,
    pub completed_progress: i64,
}

// ============================================================================
// Health Check Functions
// ============================================================================

/// Performs all health checks and prints results.
pub fn run_health_checks(db_path: &Path, store: &LearningStore) -> Result<()> {
    let db_health = check_database_health(db_path, store);
    let migrations = applied_migrations(store)?;
    let seed = check_seed_health(store);
    let stats = store_stats(store)?;

    print_health_report(&db_health, &migrations, &seed, &stats);

    Ok(())
}

fn check_database_health(db_path: &Path, store: &LearningStore) -> DatabaseHealth {
    let conn = store.database().connection();
    let status = match conn.query_row("SELECT 1", [], |_| Ok(())) {
        Ok(_) => HealthStatus::Ok,
        Err(e) => HealthStatus::Error(format!("Connection test failed: {}", e)),
    };

    DatabaseHealth {
        status,
        file_path: db_path.display().to_string(),
    }
}

fn check_seed_health(store: &LearningStore) -> SeedHealth {
    match store.database().seed_version() {
        Ok(stored) if stored == SEED_VERSION => SeedHealth {
            status: HealthStatus::Ok,
            stored,
            expected: SEED_VERSION,
        },
        Ok(stored) => SeedHealth {
            status: HealthStatus::Warning(format!(
                "Reference data is v{}, expected v{}",
                stored, SEED_VERSION
            )),
            stored,
            expected: SEED_VERSION,
        },
        Err(e) => SeedHealth {
            status: HealthStatus::Error(format!("Failed to read seed version: {}", e)),
            stored: 0,
            expected: SEED_VERSION,
        },
    }
}

/// Lists migrations recorded in `schema_migrations`, oldest first.
pub fn applied_migrations(store: &LearningStore) -> Result<Vec<MigrationInfo>> {
    let conn = store.database().connection();

    let mut stmt = conn.prepare(
        "SELECT version, applied_at, description FROM schema_migrations ORDER BY version",
    )?;

    let migrations = stmt.query_map([], |row| {
        Ok(MigrationInfo {
            version: row.get(0)?,
            applied_at: row.get(1)?,
            description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    })?;

    migrations.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Counts rows in the reference and user tables.
pub fn store_stats(store: &LearningStore) -> Result<StoreStats> {
    let conn = store.database().connection();
    let count = |sql: &str| -> Result<i64> { Ok(conn.query_row(sql, [], |row| row.get(0))?) };

    Ok(StoreStats {
        topics: count("SELECT COUNT(*) FROM topics")?,
        study_materials: count("SELECT COUNT(*) FROM study_materials")?,
        assessment_questions: count("SELECT COUNT(*) FROM assessment_questions")?,
        user_profiles: count("SELECT COUNT(*) FROM user_profiles")?,
        user_progress: count("SELECT COUNT(*) FROM user_progress")?,
        completed_progress: count("SELECT COUNT(*) FROM user_progress WHERE completed = 1")?,
    })
}

// ============================================================================
// Pretty Printing
// ============================================================================

fn status_symbol(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "\u{2713}",
        HealthStatus::Warning(_) => "!",
        HealthStatus::Error(_) => "\u{2717}",
    }
}

fn status_color(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => GREEN,
        HealthStatus::Warning(_) => YELLOW,
        HealthStatus::Error(_) => RED,
    }
}

fn print_health_report(
    db: &DatabaseHealth,
    migrations: &[MigrationInfo],
    seed: &SeedHealth,
    stats: &StoreStats,
) {
    println!("{}pathway doctor{}", BOLD, RESET);
    println!();

    // Database section
    println!("{}Database{}", BOLD, RESET);
    println!(
        "  {}{}{} Connection: {}",
        status_color(&db.status),
        status_symbol(&db.status),
        RESET,
        if db.status.is_ok() { "OK" } else { "FAILED" }
    );
    println!("    {}Path: {}{}", DIM, db.file_path, RESET);
    println!();

    // Migrations section
    println!("{}Migrations{}", BOLD, RESET);
    if migrations.is_empty() {
        println!("  {}No migrations applied{}", YELLOW, RESET);
    } else {
        for m in migrations {
            println!(
                "  {}{}{} v{}: {}",
                GREEN,
                status_symbol(&HealthStatus::Ok),
                RESET,
                m.version,
                m.description
            );
        }
        let newest = migrations.iter().map(|m| m.version).max().unwrap_or(0);
        if newest < latest_version() {
            println!(
                "  {}! Schema is behind this build (v{} < v{}){}",
                YELLOW,
                newest,
                latest_version(),
                RESET
            );
        }
    }
    println!();

    // Reference data section
    println!("{}Reference data{}", BOLD, RESET);
    let seed_text = match &seed.status {
        HealthStatus::Ok => format!("v{}", seed.stored),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    };
    println!(
        "  {}{}{} Seed version: {}",
        status_color(&seed.status),
        status_symbol(&seed.status),
        RESET,
        seed_text
    );
    println!();

    // Statistics section
    println!("{}Statistics{}", BOLD, RESET);
    println!("  Topics:     {:>6}", stats.topics);
    println!("  Materials:  {:>6}", stats.study_materials);
    println!("  Questions:  {:>6}", stats.assessment_questions);
    println!("  Profiles:   {:>6}", stats.user_profiles);
    println!(
        "  Progress:   {:>6} rows  {:>6} completed",
        stats.user_progress, stats.completed_progress
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, NewUserProfile, TopicId, hash_password};

    fn store() -> LearningStore {
        LearningStore::new(Database::in_memory().unwrap())
    }

    #[test]
    fn test_health_status_is_ok() {
        assert!(HealthStatus::Ok.is_ok());
        assert!(!HealthStatus::Warning("test".into()).is_ok());
        assert!(!HealthStatus::Error("test".into()).is_ok());
    }

    #[test]
    fn test_store_stats_fresh_database() {
        let stats = store_stats(&store()).unwrap();

        assert_eq!(
            stats,
            StoreStats {
                topics: 5,
                study_materials: 5,
                assessment_questions: 6,
                ..StoreStats::default()
            }
        );
    }

    #[test]
    fn test_store_stats_with_user_data() {
        let store = store();
        let id = store
            .create_user_profile(&NewUserProfile::new(
                "ada",
                "ada@example.com",
                hash_password("secret1"),
                "",
            ))
            .unwrap();
        store.mark_topic_completed(id, TopicId::new(1), 80).unwrap();
        store.mark_topic_completed(id, TopicId::new(2), 40).unwrap();

        let stats = store_stats(&store).unwrap();

        assert_eq!(stats.user_profiles, 1);
        assert_eq!(stats.user_progress, 2);
        assert_eq!(stats.completed_progress, 2);
    }

    #[test]
    fn test_applied_migrations() {
        let migrations = applied_migrations(&store()).unwrap();

        assert_eq!(migrations.len(), crate::db::MIGRATIONS.len());
        assert!(migrations.iter().any(|m| m.version == 1));
        assert!(migrations.iter().all(|m| !m.description.is_empty()));
    }

    #[test]
    fn test_seed_health_current() {
        let seed = check_seed_health(&store());

        assert!(seed.status.is_ok());
        assert_eq!(seed.stored, SEED_VERSION);
    }

    #[test]
    fn test_database_health_reports_path() {
        let health = check_database_health(Path::new("/tmp/learning.db"), &store());

        assert!(health.status.is_ok());
        assert_eq!(health.file_path, "/tmp/learning.db");
    }
}
