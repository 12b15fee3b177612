use roots::db::{Binding, Database, DbError};
use roots::Model;

/// Articles table. Fields are declared; the primary key is `id`.
pub struct Demo;

impl Model for Demo {
    const TABLE: &'static str = "articles";
    const FIELDS: &'static [&'static str] = &["id", "article_title", "content"];
    const PRIMARY_KEY: Option<&'static str> = Some("id");
}

/// Create the demo tables if they do not exist yet.
pub fn migrate(db: &Database) -> Result<(), DbError> {
    db.run(
        "CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            article_title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT ''
        )",
        &[] as &[Binding],
    )?;
    Ok(())
}
