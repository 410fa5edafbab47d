//! DDL for the posts table under a configurable name.
//!
//! The migration creates the default table; `PostRepository::ensure_schema`
//! runs the same statements for whatever table the repository is bound to.

use sea_orm::DbErr;

/// Table name used when none is configured.
pub const DEFAULT_POSTS_TABLE: &str = "posts";

/// Postgres identifiers are at most 63 bytes.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Reject names that would need quoting tricks or could smuggle SQL.
fn validate_table_name(table: &str) -> Result<(), DbErr> {
    let mut chars = table.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && table.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(DbErr::Custom(format!("invalid posts table name: {table:?}")))
    }
}

/// `CREATE` statements for a posts table named `table`.
///
/// `post_id` is the primary key. `(owner_id, created_at)` is unique: it
/// addresses a post by its composite key and serves per-owner listing.
///
/// # Errors
///
/// Returns `DbErr::Custom` if `table` is not a plain lowercase identifier.
pub fn create_posts_table_sql(table: &str) -> Result<String, DbErr> {
    validate_table_name(table)?;
    Ok(format!(
        r#"
CREATE TABLE IF NOT EXISTS "{table}" (
    post_id UUID PRIMARY KEY,
    owner_id TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    title VARCHAR(200) NOT NULL,
    body TEXT NOT NULL,
    published_at TIMESTAMPTZ,
    is_published BOOLEAN NOT NULL DEFAULT FALSE,
    attachment_url TEXT,
    CONSTRAINT "chk_{table}_owner_not_empty" CHECK (owner_id <> '')
);

-- Composite-key addressing and owner listing in creation order
CREATE UNIQUE INDEX IF NOT EXISTS "idx_{table}_owner_created" ON "{table}"(owner_id, created_at);
"#
    ))
}

/// `DROP` statement for a posts table named `table`.
///
/// # Errors
///
/// Returns `DbErr::Custom` if `table` is not a plain lowercase identifier.
pub fn drop_posts_table_sql(table: &str) -> Result<String, DbErr> {
    validate_table_name(table)?;
    Ok(format!(r#"DROP TABLE IF EXISTS "{table}" CASCADE;"#))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_create_sql_uses_table_name_throughout() {
        let sql = create_posts_table_sql("blog_posts").unwrap();

        assert!(sql.contains(r#"CREATE TABLE IF NOT EXISTS "blog_posts""#));
        assert!(sql.contains(r#""idx_blog_posts_owner_created" ON "blog_posts""#));
        assert!(sql.contains(r#""chk_blog_posts_owner_not_empty""#));
    }

    #[rstest]
    #[case("posts")]
    #[case("blog_posts_2")]
    #[case("_staging")]
    fn test_valid_table_names(#[case] table: &str) {
        assert!(create_posts_table_sql(table).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("2posts")]
    #[case("Posts")]
    #[case("posts; DROP TABLE users")]
    #[case("posts\"")]
    #[case("public.posts")]
    fn test_invalid_table_names(#[case] table: &str) {
        assert!(create_posts_table_sql(table).is_err());
        assert!(drop_posts_table_sql(table).is_err());
    }

    #[test]
    fn test_table_name_length_limit() {
        assert!(create_posts_table_sql(&"p".repeat(63)).is_ok());
        assert!(create_posts_table_sql(&"p".repeat(64)).is_err());
    }
}
