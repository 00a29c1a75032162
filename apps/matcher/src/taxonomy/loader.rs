//! Reads skill rows from a JSON file or from the `skills_taxonomy` tables.

use std::collections::HashMap;
use std::path::Path;

use sqlx::PgPool;
use tracing::info;

use super::{SkillRow, TaxonomyError};

/// `TAXONOMY_SOURCE` is either a Postgres DSN or a path to a JSON array of rows.
pub async fn load_rows(source: &str) -> Result<Vec<SkillRow>, TaxonomyError> {
    if is_postgres_dsn(source) {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(source)
            .await
            .map_err(|e| TaxonomyError::Source(format!("connect: {e}")))?;
        let rows = load_rows_from_db(&pool).await;
        pool.close().await;
        rows
    } else {
        load_rows_from_file(Path::new(source)).await
    }
}

fn is_postgres_dsn(source: &str) -> bool {
    source.starts_with("postgres://") || source.starts_with("postgresql://")
}

pub async fn load_rows_from_file(path: &Path) -> Result<Vec<SkillRow>, TaxonomyError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TaxonomyError::Source(format!("{}: {e}", path.display())))?;
    let rows: Vec<SkillRow> = serde_json::from_str(&raw)
        .map_err(|e| TaxonomyError::Source(format!("{}: {e}", path.display())))?;
    info!("Read {} taxonomy rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub async fn load_rows_from_db(pool: &PgPool) -> Result<Vec<SkillRow>, TaxonomyError> {
    let skills: Vec<(String, String, String, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT canonical_id, display_name, category, importance_weight
        FROM skills_taxonomy
        ORDER BY canonical_id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| TaxonomyError::Source(e.to_string()))?;

    let aliases: Vec<(String, String)> =
        sqlx::query_as("SELECT alias, canonical_id FROM skill_aliases ORDER BY alias")
            .fetch_all(pool)
            .await
            .map_err(|e| TaxonomyError::Source(e.to_string()))?;

    let rows = assemble_rows(skills, aliases);
    info!("Read {} taxonomy rows from database", rows.len());
    Ok(rows)
}

fn assemble_rows(
    skills: Vec<(String, String, String, Option<f64>)>,
    aliases: Vec<(String, String)>,
) -> Vec<SkillRow> {
    let mut by_id: HashMap<String, Vec<String>> = HashMap::new();
    for (alias, canonical_id) in aliases {
        by_id.entry(canonical_id).or_default().push(alias);
    }

    skills
        .into_iter()
        .map(
            |(canonical_id, display_name, category, importance_weight)| SkillRow {
                aliases: by_id.remove(&canonical_id).unwrap_or_default(),
                canonical_id,
                display_name,
                category,
                importance_weight,
            },
        )
        .collect()
}
