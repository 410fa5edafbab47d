//! Postgres-backed `PostStore`.
//!
//! Every mutation is a single conditional statement. When it affects no row, a
//! read-only probe decides between `NotFound` and `OwnershipViolation`.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, Order, Query, SelectStatement};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityName, FromQueryResult, RuntimeErr, sqlx,
};
use tracing::{debug, info};

use crate::entities::posts;
use crate::schema::create_posts_table_sql;
use quill_core::post::{Post, PostDraft, PostError, PostPatch, PostStore, PostSummary};
use quill_shared::{OwnerId, PostId};

/// Post repository over a configurable table.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
    table: String,
}

impl PostRepository {
    /// Create a repository over the default `posts` table.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_table(db, posts::Entity.table_name())
    }

    /// Create a repository over `table`.
    #[must_use]
    pub fn with_table(db: DatabaseConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    /// Name of the table this repository reads and writes.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the bound table and its index if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is not a plain identifier or the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        self.db
            .execute_unprepared(&create_posts_table_sql(&self.table)?)
            .await?;
        info!(table = %self.table, "Posts table ready");
        Ok(())
    }

    fn select_all(&self) -> SelectStatement {
        Query::select()
            .columns([
                posts::Column::PostId,
                posts::Column::OwnerId,
                posts::Column::CreatedAt,
                posts::Column::Title,
                posts::Column::Body,
                posts::Column::PublishedAt,
                posts::Column::IsPublished,
                posts::Column::AttachmentUrl,
            ])
            .from(Alias::new(&self.table))
            .to_owned()
    }

    async fn fetch_one(&self, query: &SelectStatement) -> Result<Option<posts::Model>, PostError> {
        let stmt = self.db.get_database_backend().build(query);
        posts::Model::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn exists(
        &self,
        post_id: PostId,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<bool, PostError> {
        let mut query = self.select_all();
        query.and_where(Expr::col(posts::Column::PostId).eq(post_id.into_inner()));
        if let Some(created_at) = created_at {
            query.and_where(Expr::col(posts::Column::CreatedAt).eq(created_at));
        }
        query.limit(1);
        Ok(self.fetch_one(&query).await?.is_some())
    }

    /// Classify a conditional statement that affected no row.
    async fn condition_failed(
        &self,
        post_id: PostId,
        created_at: Option<DateTime<Utc>>,
    ) -> PostError {
        match self.exists(post_id, created_at).await {
            Ok(true) => PostError::OwnershipViolation(post_id),
            Ok(false) => PostError::NotFound(post_id),
            Err(e) => e,
        }
    }
}

impl PostStore for PostRepository {
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<PostSummary>, PostError> {
        let query = self
            .select_all()
            .and_where(Expr::col(posts::Column::OwnerId).eq(owner.as_str()))
            .order_by(posts::Column::CreatedAt, Order::Asc)
            .order_by(posts::Column::PostId, Order::Asc)
            .to_owned();
        let stmt = self.db.get_database_backend().build(&query);

        let rows = posts::Model::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(|row| to_post(row).summary()).collect())
    }

    async fn create(&self, draft: PostDraft, owner: &OwnerId) -> Result<Post, PostError> {
        let post = draft.into_post(owner.clone());

        let mut insert = Query::insert();
        insert.into_table(Alias::new(&self.table)).columns([
            posts::Column::PostId,
            posts::Column::OwnerId,
            posts::Column::CreatedAt,
            posts::Column::Title,
            posts::Column::Body,
            posts::Column::PublishedAt,
            posts::Column::IsPublished,
            posts::Column::AttachmentUrl,
        ]);
        insert
            .values([
                post.post_id.into_inner().into(),
                post.owner_id.as_str().into(),
                post.created_at.into(),
                post.title.as_str().into(),
                post.body.as_str().into(),
                post.published_at.into(),
                post.is_published.into(),
                post.attachment_url.clone().into(),
            ])
            .map_err(|e| PostError::storage(e.to_string()))?;

        let stmt = self.db.get_database_backend().build(&insert);
        self.db.execute(stmt).await.map_err(map_db_err)?;

        debug!(post_id = %post.post_id, table = %self.table, "Inserted post");
        Ok(post)
    }

    async fn delete(
        &self,
        post_id: PostId,
        created_at: DateTime<Utc>,
        owner: &OwnerId,
    ) -> Result<(), PostError> {
        let query = Query::delete()
            .from_table(Alias::new(&self.table))
            .and_where(Expr::col(posts::Column::OwnerId).eq(owner.as_str()))
            .and_where(Expr::col(posts::Column::CreatedAt).eq(created_at))
            .and_where(Expr::col(posts::Column::PostId).eq(post_id.into_inner()))
            .to_owned();
        let stmt = self.db.get_database_backend().build(&query);

        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(self.condition_failed(post_id, Some(created_at)).await);
        }
        Ok(())
    }

    async fn update(
        &self,
        patch: PostPatch,
        post_id: PostId,
        owner: &OwnerId,
    ) -> Result<(), PostError> {
        let query = Query::update()
            .table(Alias::new(&self.table))
            .values([
                (posts::Column::Title, patch.title.into()),
                (posts::Column::Body, patch.body.into()),
                (posts::Column::PublishedAt, patch.published_at.into()),
                (posts::Column::IsPublished, patch.is_published.into()),
            ])
            .and_where(Expr::col(posts::Column::PostId).eq(post_id.into_inner()))
            .and_where(Expr::col(posts::Column::OwnerId).eq(owner.as_str()))
            .to_owned();
        let stmt = self.db.get_database_backend().build(&query);

        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(self.condition_failed(post_id, None).await);
        }
        Ok(())
    }

    async fn attach_url(&self, url: &str, post_id: PostId) -> Result<(), PostError> {
        let query = Query::update()
            .table(Alias::new(&self.table))
            .value(posts::Column::AttachmentUrl, url)
            .and_where(Expr::col(posts::Column::PostId).eq(post_id.into_inner()))
            .to_owned();
        let stmt = self.db.get_database_backend().build(&query);

        let result = self.db.execute(stmt).await.map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(PostError::NotFound(post_id));
        }
        Ok(())
    }

    async fn find_owned(&self, post_id: PostId, owner: &OwnerId) -> Result<Post, PostError> {
        let query = self
            .select_all()
            .and_where(Expr::col(posts::Column::PostId).eq(post_id.into_inner()))
            .to_owned();

        match self.fetch_one(&query).await? {
            Some(row) if row.owner_id == owner.as_str() => Ok(to_post(row)),
            Some(_) => Err(PostError::OwnershipViolation(post_id)),
            None => Err(PostError::NotFound(post_id)),
        }
    }
}

fn to_post(row: posts::Model) -> Post {
    Post {
        post_id: PostId::from_uuid(row.post_id),
        owner_id: OwnerId::new(row.owner_id),
        created_at: row.created_at,
        title: row.title,
        body: row.body,
        published_at: row.published_at,
        is_published: row.is_published,
        attachment_url: row.attachment_url,
    }
}

/// SQLSTATEs worth retrying: statement timeout, serialization failure, deadlock.
const TRANSIENT_SQLSTATES: [&str; 3] = ["57014", "40001", "40P01"];

fn is_transient_sqlstate(code: &str) -> bool {
    TRANSIENT_SQLSTATES.contains(&code)
}

fn is_transient_sqlx(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db.code().is_some_and(|code| is_transient_sqlstate(&code)),
        _ => false,
    }
}

/// Failures that may succeed on retry become `TransientStorage`; everything
/// else will not.
fn map_db_err(err: DbErr) -> PostError {
    let transient = match &err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            is_transient_sqlx(e)
        }
        _ => false,
    };

    if transient {
        PostError::transient(err.to_string())
    } else {
        PostError::storage(err.to_string())
    }
}
