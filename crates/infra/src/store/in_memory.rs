use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use yatube_blog::{
    Comment, Follow, Group, NewComment, NewFollow, NewGroup, NewPost, Post, User, Username,
};
use yatube_core::{CommentId, Entity, FollowId, GroupId, PostId, UserId};

use super::{BlogStore, StoreError, StoreResult, Window};
use crate::search::SearchTerms;

/// Rows of one entity type keyed (and therefore ordered) by id.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: From<i64>,
{
    fn next_id(&mut self) -> E::Id {
        self.last_id += 1;
        E::Id::from(self.last_id)
    }

    fn insert(&mut self, row: E) -> E {
        self.rows.insert(row.id(), row.clone());
        row
    }

    fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    /// Overwrite an existing row; `NotFound` if it was deleted meanwhile.
    fn replace(&mut self, row: &E) -> StoreResult<E> {
        match self.rows.get_mut(&row.id()) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row.clone())
            }
            None => Err(StoreError::NotFound(E::KIND)),
        }
    }

    fn remove(&mut self, id: E::Id) -> StoreResult<E> {
        self.rows.remove(&id).ok_or(StoreError::NotFound(E::KIND))
    }

    fn values(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    groups: Table<Group>,
    posts: Table<Post>,
    comments: Table<Comment>,
    follows: Table<Follow>,
}

impl Tables {
    fn user_by_name(&self, username: &Username) -> Option<&User> {
        self.users.values().find(|u| &u.username == username)
    }

    fn check_group(&self, group: Option<GroupId>) -> StoreResult<()> {
        match group {
            Some(id) if self.groups.get(id).is_none() => {
                Err(StoreError::MissingReference { field: "group" })
            }
            _ => Ok(()),
        }
    }
}

/// In-memory blog store for tests/dev.
///
/// A single lock over all tables keeps every operation atomic, including the
/// post → comments cascade.
#[derive(Debug, Default)]
pub struct InMemoryBlogStore {
    inner: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BlogStore for InMemoryBlogStore {
    async fn ensure_user(&self, username: &Username) -> StoreResult<User> {
        let mut tables = self.write()?;
        if let Some(user) = tables.user_by_name(username) {
            return Ok(user.clone());
        }
        let id: UserId = tables.users.next_id();
        tracing::info!(user_id = %id, username = %username, "registered user");
        Ok(tables.users.insert(User {
            id,
            username: username.clone(),
        }))
    }

    async fn find_user(&self, username: &Username) -> StoreResult<Option<User>> {
        Ok(self.read()?.user_by_name(username).cloned())
    }

    async fn insert_group(&self, group: NewGroup) -> StoreResult<Group> {
        let mut tables = self.write()?;
        if tables.groups.values().any(|g| g.slug == group.slug) {
            return Err(StoreError::Conflict(format!("group slug '{}' already exists", group.slug)));
        }
        let id: GroupId = tables.groups.next_id();
        Ok(tables.groups.insert(group.into_group(id)))
    }

    async fn list_groups(&self) -> StoreResult<Vec<Group>> {
        Ok(self.read()?.groups.values().cloned().collect())
    }

    async fn get_group(&self, id: GroupId) -> StoreResult<Option<Group>> {
        Ok(self.read()?.groups.get(id).cloned())
    }

    async fn count_posts(&self) -> StoreResult<u64> {
        Ok(self.read()?.posts.rows.len() as u64)
    }

    async fn list_posts(&self, window: Option<Window>) -> StoreResult<Vec<Post>> {
        let tables = self.read()?;
        let all = tables.posts.values().cloned();
        Ok(match window {
            Some(w) => all
                .skip(usize::try_from(w.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(w.limit).unwrap_or(usize::MAX))
                .collect(),
            None => all.collect(),
        })
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(self.read()?.posts.get(id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> StoreResult<Post> {
        let mut tables = self.write()?;
        if tables.user_by_name(&post.author).is_none() {
            return Err(StoreError::MissingReference { field: "author" });
        }
        tables.check_group(post.group)?;
        let id: PostId = tables.posts.next_id();
        Ok(tables.posts.insert(post.into_post(id, Utc::now())))
    }

    async fn update_post(&self, post: &Post) -> StoreResult<Post> {
        let mut tables = self.write()?;
        tables.check_group(post.group)?;
        tables.posts.replace(post)
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.posts.remove(id)?;
        tables.comments.rows.retain(|_, c| c.post != id);
        Ok(())
    }

    async fn list_comments(&self, post: PostId) -> StoreResult<Vec<Comment>> {
        Ok(self
            .read()?
            .comments
            .values()
            .filter(|c| c.post == post)
            .cloned()
            .collect())
    }

    async fn get_comment(&self, post: PostId, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(self
            .read()?
            .comments
            .get(id)
            .filter(|c| c.post == post)
            .cloned())
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tables = self.write()?;
        if tables.posts.get(comment.post).is_none() {
            return Err(StoreError::MissingReference { field: "post" });
        }
        if tables.user_by_name(&comment.author).is_none() {
            return Err(StoreError::MissingReference { field: "author" });
        }
        let id: CommentId = tables.comments.next_id();
        Ok(tables.comments.insert(comment.into_comment(id, Utc::now())))
    }

    async fn update_comment(&self, comment: &Comment) -> StoreResult<Comment> {
        self.write()?.comments.replace(comment)
    }

    async fn delete_comment(&self, id: CommentId) -> StoreResult<()> {
        self.write()?.comments.remove(id).map(|_| ())
    }

    async fn list_follows(&self, user: &Username, search: &SearchTerms) -> StoreResult<Vec<Follow>> {
        Ok(self
            .read()?
            .follows
            .values()
            .filter(|f| &f.user == user && search.matches(f))
            .cloned()
            .collect())
    }

    async fn insert_follow(&self, follow: NewFollow) -> StoreResult<Follow> {
        let mut tables = self.write()?;
        if tables.user_by_name(&follow.user).is_none() {
            return Err(StoreError::MissingReference { field: "user" });
        }
        if tables.user_by_name(&follow.following).is_none() {
            return Err(StoreError::MissingReference { field: "following" });
        }
        if tables
            .follows
            .values()
            .any(|f| f.user == follow.user && f.following == follow.following)
        {
            return Err(StoreError::Conflict(format!(
                "{} already follows {}",
                follow.user, follow.following
            )));
        }
        let id: FollowId = tables.follows.next_id();
        Ok(tables.follows.insert(follow.into_follow(id)))
    }
}
