use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Схема хранилища. Таблицы создаются при старте, если их еще нет.
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_data_type",
        r#"
        CREATE TABLE IF NOT EXISTS a001_data_type (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            input_type TEXT NOT NULL,
            is_complex INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_data_category",
        r#"
        CREATE TABLE IF NOT EXISTS a002_data_category (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            default_value TEXT NOT NULL DEFAULT '',
            add_default INTEGER NOT NULL DEFAULT 0,
            positive_increment REAL NOT NULL DEFAULT 1,
            negative_increment REAL NOT NULL DEFAULT 1,
            data_type_id TEXT NOT NULL,
            entry_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a003_data_entry",
        r#"
        CREATE TABLE IF NOT EXISTS a003_data_entry (
            id TEXT PRIMARY KEY NOT NULL,
            date TEXT NOT NULL,
            value TEXT NOT NULL DEFAULT '',
            note TEXT NOT NULL DEFAULT '',
            data_category_id TEXT NOT NULL,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_a002_data_category_type ON a002_data_category (data_type_id);",
    "CREATE INDEX IF NOT EXISTS idx_a003_data_entry_category_date ON a003_data_entry (data_category_id, date);",
    "CREATE INDEX IF NOT EXISTS idx_a003_data_entry_date_id ON a003_data_entry (date, id);",
];

/// Подключение к SQLite и создание схемы
pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/tracker.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Connecting to database: {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, sql) in SCHEMA {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create table {}: {}", table, e))?;
        tracing::debug!("Table {} is ready", table);
    }
    for sql in INDEXES {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}

pub fn is_initialized() -> bool {
    DB_CONN.get().is_some()
}
