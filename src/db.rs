use crate::models::{
    role::{Role, EVERYONE_ROLE},
    Board, NewBoard, SiteSettings,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the data directory exists
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let url = if database_url.contains('?') || database_url.contains(":memory:") {
        database_url.to_string()
    } else {
        format!("{}?mode=rwc", database_url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// What [`seed_defaults`] actually inserted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub settings_created: bool,
    pub everyone_role_created: bool,
    pub boards_created: Vec<Board>,
}

const DEFAULT_BOARDS: [(&str, &str, &str); 3] = [
    ("Feature Requests", "feature-requests", "22c55e"),
    ("Bug Reports", "bug-reports", "ef4444"),
    ("General Feedback", "general-feedback", "3b82f6"),
];

/// Inserts the settings row, the `@everyone` role and the default boards,
/// each only when absent. Safe to run repeatedly.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<SeedReport, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut report = SeedReport::default();

    if SiteSettings::load(&mut *tx).await?.is_none() {
        SiteSettings::insert(&mut *tx, &SiteSettings::default()).await?;
        report.settings_created = true;
    }

    if Role::find_by_name(&mut *tx, EVERYONE_ROLE).await?.is_none() {
        Role::create(&mut *tx, EVERYONE_ROLE).await?;
        report.everyone_role_created = true;
    }

    if Board::count(&mut *tx).await? == 0 {
        for (name, url, color) in DEFAULT_BOARDS {
            let board = Board::create(&mut *tx, &NewBoard::new(name, url, color)).await?;
            report.boards_created.push(board);
        }
    }

    tx.commit().await?;

    Ok(report)
}
