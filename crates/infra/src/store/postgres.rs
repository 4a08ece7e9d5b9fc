//! Postgres-backed blog store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `MissingReference` (field derived from the constraint name) |
//! | Database (check constraint violation) | `23514` | `Conflict` |
//! | anything else | n/a | `Backend` |
//!
//! Every mutating method runs inside its own transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::instrument;

use yatube_blog::{
    Comment, Follow, Group, NewComment, NewFollow, NewGroup, NewPost, Post, Slug, User, Username,
};
use yatube_core::{CommentId, FollowId, GroupId, PostId, UserId};

use super::{BlogStore, StoreError, StoreResult, Window};
use crate::search::SearchTerms;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const POST_SELECT: &str = r#"
    SELECT p.id, u.username AS author, p.text, p.pub_date, p.image, p.group_id
    FROM blog_posts p
    JOIN blog_users u ON u.id = p.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, u.username AS author, c.post_id, c.text, c.created
    FROM blog_comments c
    JOIN blog_users u ON u.id = c.author_id
"#;

#[derive(Debug, Clone)]
pub struct PostgresBlogStore {
    pool: Arc<PgPool>,
}

impl PostgresBlogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema (idempotent).
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn begin(&self, operation: &str) -> StoreResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

async fn user_id_by_name(
    tx: &mut Transaction<'static, Postgres>,
    username: &Username,
    field: &'static str,
) -> StoreResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM blog_users WHERE username = $1")
        .bind(username.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("user_id_by_name", e))?
        .ok_or(StoreError::MissingReference { field })
}

async fn commit(tx: Transaction<'static, Postgres>, operation: &str) -> StoreResult<()> {
    tx.commit().await.map_err(|e| map_sqlx_error(operation, e))
}

#[async_trait]
impl BlogStore for PostgresBlogStore {
    #[instrument(skip(self), err)]
    async fn ensure_user(&self, username: &Username) -> StoreResult<User> {
        // The no-op update makes RETURNING yield the id for existing rows too.
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO blog_users (username) VALUES ($1)
            ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
            RETURNING id
            "#,
        )
        .bind(username.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_user", e))?;

        Ok(User {
            id: UserId::new(id),
            username: username.clone(),
        })
    }

    #[instrument(skip(self), err)]
    async fn find_user(&self, username: &Username) -> StoreResult<Option<User>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM blog_users WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        Ok(id.map(|id| User {
            id: UserId::new(id),
            username: username.clone(),
        }))
    }

    #[instrument(skip(self), err)]
    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO blog_groups (title, slug, description) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&group.title)
        .bind(group.slug.as_str())
        .bind(&group.description)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_group", e))?;

        Ok(group.into_group(GroupId::new(id)))
    }

    #[instrument(skip(self), err)]
    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        let rows = sqlx::query("SELECT id, title, slug, description FROM blog_groups ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_groups", e))?;

        rows.iter().map(|r| Group::try_from(decode::<GroupRow>(r)?)).collect()
    }

    #[instrument(skip(self), err)]
    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        let row = sqlx::query("SELECT id, title, slug, description FROM blog_groups WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_group", e))?;

        row.map(|r| Group::try_from(decode::<GroupRow>(&r)?)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn count_posts(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_posts", e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    #[instrument(skip(self), err)]
    async fn list_posts(&self, window: Option<Window>) -> StoreResult<Vec<Post>> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_SELECT);
        qb.push(" ORDER BY p.id");
        if let Some(w) = window {
            qb.push(" LIMIT ")
                .push_bind(clamp_i64(w.limit))
                .push(" OFFSET ")
                .push_bind(clamp_i64(w.offset));
        }
        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_posts", e))?;

        rows.iter().map(|r| Post::try_from(decode::<PostRow>(r)?)).collect()
    }

    #[instrument(skip(self), err)]
    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let row = sqlx::query(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_post", e))?;

        row.map(|r| Post::try_from(decode::<PostRow>(&r)?)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut tx = self.begin("insert_post").await?;
        let author_id = user_id_by_name(&mut tx, &post.author, "author").await?;

        let row = sqlx::query(
            r#"
            INSERT INTO blog_posts (author_id, text, image, group_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, pub_date
            "#,
        )
        .bind(author_id)
        .bind(&post.text)
        .bind(post.image.as_deref())
        .bind(post.group.map(|g| g.get()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_post", e))?;

        let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("insert_post", e))?;
        let pub_date: DateTime<Utc> = row
            .try_get("pub_date")
            .map_err(|e| map_sqlx_error("insert_post", e))?;
        commit(tx, "insert_post").await?;

        Ok(post.into_post(PostId::new(id), pub_date))
    }

    #[instrument(skip(self), fields(post_id = %post.id), err)]
    async fn update_post(&self, post: &Post) -> StoreResult<Post> {
        let mut tx = self.begin("update_post").await?;
        let result = sqlx::query(
            "UPDATE blog_posts SET text = $2, image = $3, group_id = $4 WHERE id = $1",
        )
        .bind(post.id.get())
        .bind(&post.text)
        .bind(post.image.as_deref())
        .bind(post.group.map(|g| g.get()))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_post", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("post"));
        }
        commit(tx, "update_post").await?;
        Ok(post.clone())
    }

    #[instrument(skip(self), err)]
    async fn delete_post(&self, id: PostId) -> StoreResult<()> {
        let mut tx = self.begin("delete_post").await?;
        // Comments go with the post via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("post"));
        }
        commit(tx, "delete_post").await
    }

    #[instrument(skip(self), err)]
    async fn list_comments(&self, post: PostId) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(&format!("{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.id"))
            .bind(post.get())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_comments", e))?;

        rows.iter().map(|r| Comment::try_from(decode::<CommentRow>(r)?)).collect()
    }

    #[instrument(skip(self), err)]
    async fn get_comment(&self, post: PostId, id: CommentId) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(&format!("{COMMENT_SELECT} WHERE c.post_id = $1 AND c.id = $2"))
            .bind(post.get())
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_comment", e))?;

        row.map(|r| Comment::try_from(decode::<CommentRow>(&r)?)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tx = self.begin("insert_comment").await?;
        let author_id = user_id_by_name(&mut tx, &comment.author, "author").await?;

        let row = sqlx::query(
            r#"
            INSERT INTO blog_comments (author_id, post_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, created
            "#,
        )
        .bind(author_id)
        .bind(comment.post.get())
        .bind(&comment.text)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_comment", e))?;

        let id: i64 = row.try_get("id").map_err(|e| map_sqlx_error("insert_comment", e))?;
        let created: DateTime<Utc> = row
            .try_get("created")
            .map_err(|e| map_sqlx_error("insert_comment", e))?;
        commit(tx, "insert_comment").await?;

        Ok(comment.into_comment(CommentId::new(id), created))
    }

    #[instrument(skip(self), fields(comment_id = %comment.id), err)]
    async fn update_comment(&self, comment: &Comment) -> StoreResult<Comment> {
        let mut tx = self.begin("update_comment").await?;
        let result = sqlx::query("UPDATE blog_comments SET text = $2 WHERE id = $1")
            .bind(comment.id.get())
            .bind(&comment.text)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_comment", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("comment"));
        }
        commit(tx, "update_comment").await?;
        Ok(comment.clone())
    }

    #[instrument(skip(self), err)]
    async fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        let mut tx = self.begin("delete_comment").await?;
        let result = sqlx::query("DELETE FROM blog_comments WHERE id = $1")
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_comment", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("comment"));
        }
        commit(tx, "delete_comment").await
    }

    #[instrument(skip(self), err)]
    async fn list_follows(&self, user: &Username, search: &SearchTerms) -> StoreResult<Vec<Follow>> {
        let mut qb = follows_query(user, search);
        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_follows", e))?;

        rows.iter().map(|r| Follow::try_from(decode::<FollowRow>(r)?)).collect()
    }

    #[instrument(skip(self), err)]
    async fn insert_follow(&self, follow: NewFollow) -> StoreResult<Follow> {
        let mut tx = self.begin("insert_follow").await?;
        let user_id = user_id_by_name(&mut tx, &follow.user, "user").await?;
        let following_id = user_id_by_name(&mut tx, &follow.following, "following").await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO blog_follows (user_id, following_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(following_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_follow", e))?;
        commit(tx, "insert_follow").await?;

        Ok(follow.into_follow(FollowId::new(id)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

struct GroupRow {
    id: i64,
    title: String,
    slug: String,
    description: String,
}

impl<'r> FromRow<'r, PgRow> for GroupRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(GroupRow {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
        })
    }
}

impl TryFrom<GroupRow> for Group {
    type Error = StoreError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        Ok(Group {
            id: GroupId::new(row.id),
            title: row.title,
            slug: Slug::parse(row.slug).map_err(corrupt_row)?,
            description: row.description,
        })
    }
}

struct PostRow {
    id: i64,
    author: String,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    group_id: Option<i64>,
}

impl<'r> FromRow<'r, PgRow> for PostRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PostRow {
            id: row.try_get("id")?,
            author: row.try_get("author")?,
            text: row.try_get("text")?,
            pub_date: row.try_get("pub_date")?,
            image: row.try_get("image")?,
            group_id: row.try_get("group_id")?,
        })
    }
}

impl TryFrom<PostRow> for Post {
    type Error = StoreError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: PostId::new(row.id),
            author: Username::parse(row.author).map_err(corrupt_row)?,
            text: row.text,
            pub_date: row.pub_date,
            image: row.image,
            group: row.group_id.map(GroupId::new),
        })
    }
}

struct CommentRow {
    id: i64,
    author: String,
    post_id: i64,
    text: String,
    created: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CommentRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CommentRow {
            id: row.try_get("id")?,
            author: row.try_get("author")?,
            post_id: row.try_get("post_id")?,
            text: row.try_get("text")?,
            created: row.try_get("created")?,
        })
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: CommentId::new(row.id),
            author: Username::parse(row.author).map_err(corrupt_row)?,
            post: PostId::new(row.post_id),
            text: row.text,
            created: row.created,
        })
    }
}

struct FollowRow {
    id: i64,
    user_name: String,
    following_name: String,
}

impl<'r> FromRow<'r, PgRow> for FollowRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(FollowRow {
            id: row.try_get("id")?,
            user_name: row.try_get("user_name")?,
            following_name: row.try_get("following_name")?,
        })
    }
}

impl TryFrom<FollowRow> for Follow {
    type Error = StoreError;

    fn try_from(row: FollowRow) -> Result<Self, Self::Error> {
        Ok(Follow {
            id: FollowId::new(row.id),
            user: Username::parse(row.user_name).map_err(corrupt_row)?,
            following: Username::parse(row.following_name).map_err(corrupt_row)?,
        })
    }
}

fn decode<'r, T: FromRow<'r, PgRow>>(row: &'r PgRow) -> StoreResult<T> {
    T::from_row(row).map_err(|e| StoreError::Backend(format!("failed to decode row: {e}")))
}

fn corrupt_row(err: yatube_core::DomainError) -> StoreError {
    StoreError::Backend(format!("stored row violates domain rules: {err}"))
}

fn clamp_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Escape `LIKE` metacharacters so search terms match literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Follows of `user`, each search term narrowing by `ILIKE` on either username.
fn follows_query(user: &Username, search: &SearchTerms) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT f.id, u.username AS user_name, t.username AS following_name \
         FROM blog_follows f \
         JOIN blog_users u ON u.id = f.user_id \
         JOIN blog_users t ON t.id = f.following_id \
         WHERE u.username = ",
    );
    qb.push_bind(user.as_str().to_string());
    for term in search.terms() {
        let pattern = format!("%{}%", escape_like(term));
        qb.push(" AND (u.username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.username ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(" ORDER BY f.id");
    qb
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => classify_database_error(
            db_err.code().as_deref(),
            db_err.constraint(),
            format!("database error in {}: {}", operation, db_err.message()),
        ),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Map a Postgres SQLSTATE (and violated constraint) to a store error.
fn classify_database_error(code: Option<&str>, constraint: Option<&str>, msg: String) -> StoreError {
    match code {
        Some("23505") | Some("23514") => StoreError::Conflict(msg),
        Some("23503") => {
            let field = match constraint {
                Some("blog_posts_group_fkey") => "group",
                Some("blog_comments_post_fkey") => "post",
                _ => "reference",
            };
            StoreError::MissingReference { field }
        }
        _ => StoreError::Backend(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("a_b%c\\d"), "a\\_b\\%c\\\\d");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn follow_search_adds_one_escaped_clause_per_term() {
        let user = Username::parse("alice").unwrap();

        let plain = follows_query(&user, &SearchTerms::parse(None));
        assert!(plain.sql().ends_with("WHERE u.username = $1 ORDER BY f.id"));

        let searched = follows_query(&user, &SearchTerms::parse(Some("bo, 50%")));
        assert!(searched.sql().ends_with(
            "WHERE u.username = $1 \
             AND (u.username ILIKE $2 OR t.username ILIKE $3) \
             AND (u.username ILIKE $4 OR t.username ILIKE $5) \
             ORDER BY f.id"
        ));
    }

    #[test]
    fn constraint_violations_map_to_store_errors() {
        let msg = || "boom".to_string();
        assert_eq!(
            classify_database_error(Some("23505"), Some("blog_follows_unique_pair"), msg()),
            StoreError::Conflict("boom".into())
        );
        assert_eq!(
            classify_database_error(Some("23514"), Some("blog_follows_no_self"), msg()),
            StoreError::Conflict("boom".into())
        );
        assert_eq!(
            classify_database_error(Some("23503"), Some("blog_posts_group_fkey"), msg()),
            StoreError::MissingReference { field: "group" }
        );
        assert_eq!(
            classify_database_error(Some("23503"), Some("blog_comments_post_fkey"), msg()),
            StoreError::MissingReference { field: "post" }
        );
        assert_eq!(
            classify_database_error(Some("23503"), None, msg()),
            StoreError::MissingReference { field: "reference" }
        );
        assert_eq!(
            classify_database_error(Some("40001"), None, msg()),
            StoreError::Backend("boom".into())
        );
    }

    #[test]
    fn window_bounds_saturate() {
        assert_eq!(clamp_i64(u64::MAX), i64::MAX);
        assert_eq!(clamp_i64(10), 10);
    }
}
