use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::error::{HeartbridgeError, Result};
use super::post::{NewPost, Post, Role};

/// Read side of post storage, as consumed by the analytics
pub trait PostSource {
    /// All posts, in any stable order
    fn list_posts(&self) -> Result<Vec<Post>>;

    fn list_posts_by_role(&self, role: Role) -> Result<Vec<Post>>;
}

impl PostSource for Vec<Post> {
    fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.clone())
    }

    fn list_posts_by_role(&self, role: Role) -> Result<Vec<Post>> {
        Ok(self
            .iter()
            .filter(|p| p.author_role == role)
            .cloned()
            .collect())
    }
}

const POST_COLUMNS: &str = "id, role, nickname, title, content, is_hidden, created_at, likes";

/// SQLite-based post storage
pub struct PostStore {
    conn: Connection,
}

impl PostStore {
    /// Open (or create) the database at `db_path`
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                role TEXT NOT NULL,
                nickname TEXT NOT NULL,
                title TEXT,
                content TEXT NOT NULL,
                is_hidden BOOLEAN DEFAULT 0,
                created_at TEXT NOT NULL,
                likes INTEGER DEFAULT 0
            )",
            [],
        )?;

        // Older databases were created before likes existed
        let has_likes = conn.prepare("SELECT likes FROM posts LIMIT 1").is_ok();
        if !has_likes {
            warn!("posts table has no likes column, migrating");
            conn.execute("ALTER TABLE posts ADD COLUMN likes INTEGER DEFAULT 0", [])?;
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at)",
            [],
        )?;

        conn.execute("CREATE INDEX IF NOT EXISTS idx_posts_role ON posts(role)", [])?;

        debug!(path = %db_path.display(), "opened post store");
        Ok(Self { conn })
    }

    /// In-memory database, mostly for tests
    pub fn in_memory() -> Result<Self> {
        Self::new(PathBuf::from(":memory:"))
    }

    /// Insert a new post and return its id
    pub fn create(&self, post: &NewPost) -> Result<i64> {
        post.validate()?;

        self.conn.execute(
            "INSERT INTO posts (role, nickname, title, content, is_hidden, created_at, likes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
            params![
                post.author_role.label(),
                &post.nickname,
                &post.title,
                &post.content,
                post.is_hidden,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert with an explicit like count (seeding)
    pub fn create_with_likes(&self, post: &NewPost, likes: u32) -> Result<i64> {
        let id = self.create(post)?;
        self.conn
            .execute("UPDATE posts SET likes = ?1 WHERE id = ?2", params![likes, id])?;
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Post> {
        let sql = format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        match stmt.query_row(params![id], row_to_post) {
            Ok(post) => Ok(post),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(HeartbridgeError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// All posts, newest first
    pub fn list(&self) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let posts = stmt
            .query_map([], row_to_post)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Posts written by one cohort, newest first
    pub fn list_by_role(&self, role: Role) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {} FROM posts WHERE role = ?1 ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let posts = stmt
            .query_map(params![role.label()], row_to_post)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    pub fn like(&self, id: i64) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("UPDATE posts SET likes = likes + 1 WHERE id = ?1", params![id])?;

        if rows_affected == 0 {
            return Err(HeartbridgeError::NotFound(id));
        }
        Ok(())
    }

    /// Remove a like; the count never drops below zero
    pub fn unlike(&self, id: i64) -> Result<()> {
        let rows_affected = self.conn.execute(
            "UPDATE posts SET likes = MAX(0, likes - 1) WHERE id = ?1",
            params![id],
        )?;

        if rows_affected == 0 {
            return Err(HeartbridgeError::NotFound(id));
        }
        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let count: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl PostSource for PostStore {
    fn list_posts(&self) -> Result<Vec<Post>> {
        self.list()
    }

    fn list_posts_by_role(&self, role: Role) -> Result<Vec<Post>> {
        self.list_by_role(role)
    }
}

fn row_to_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    let role: String = row.get(1)?;
    let created_at: String = row.get(6)?;
    let likes: Option<u32> = row.get(7)?;

    Ok(Post {
        id: row.get(0)?,
        author_role: role.parse::<Role>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?,
        nickname: row.get(2)?,
        title: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        content: row.get(4)?,
        is_hidden: row.get::<_, Option<bool>>(5)?.unwrap_or(false),
        created_at: parse_timestamp(&created_at).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        likes: likes.unwrap_or(0),
    })
}

/// RFC 3339, or the naive `YYYY-MM-DD HH:MM:SS[.f]` SQLite default (read as UTC)
fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> PostStore {
        PostStore::in_memory().unwrap()
    }

    fn new_post(role: Role, content: &str) -> NewPost {
        NewPost::new(role, "迷茫的刺猬", "标题", content)
    }

    #[test]
    fn test_create_and_get() {
        let store = create_test_store();
        let id = store
            .create(&new_post(Role::Child, "压力好大").hidden(true))
            .unwrap();

        let post = store.get(id).unwrap();
        assert_eq!(post.id, id);
        assert_eq!(post.author_role, Role::Child);
        assert_eq!(post.content, "压力好大");
        assert!(post.is_hidden);
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn test_empty_post_rejected() {
        let store = create_test_store();
        let result = store.create(&NewPost::new(Role::Child, "nick", "", ""));
        assert!(matches!(result, Err(HeartbridgeError::InvalidPost(_))));

        let result = store.create(&NewPost::new(Role::Child, "nick", "标题", "   "));
        assert!(matches!(result, Err(HeartbridgeError::InvalidPost(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_migrates_legacy_schema() {
        let path = std::env::temp_dir().join(format!(
            "heartbridge-legacy-{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "CREATE TABLE posts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    role TEXT NOT NULL,
                    nickname TEXT NOT NULL,
                    title TEXT,
                    content TEXT NOT NULL,
                    is_hidden BOOLEAN DEFAULT 0,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                )",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO posts (role, nickname, title, content) VALUES ('家长', '园丁', '旧帖', '以前的内容')",
                [],
            )
            .unwrap();
        }

        let store = PostStore::new(path.clone()).unwrap();
        let posts = store.list().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].likes, 0);
        assert_eq!(posts[0].author_role, Role::Parent);
        assert!(!posts[0].is_hidden);

        store.like(posts[0].id).unwrap();
        assert_eq!(store.get(posts[0].id).unwrap().likes, 1);

        drop(store);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_get_missing() {
        let store = create_test_store();
        assert!(matches!(store.get(42), Err(HeartbridgeError::NotFound(42))));
    }

    #[test]
    fn test_list_by_role() {
        let store = create_test_store();
        store.create(&new_post(Role::Parent, "一")).unwrap();
        store.create(&new_post(Role::Child, "二")).unwrap();
        store.create(&new_post(Role::Child, "三")).unwrap();

        assert_eq!(store.list().unwrap().len(), 3);
        assert_eq!(store.list_by_role(Role::Parent).unwrap().len(), 1);
        assert_eq!(store.list_by_role(Role::Child).unwrap().len(), 2);
        assert_eq!(store.list_posts_by_role(Role::Child).unwrap().len(), 2);
    }

    #[test]
    fn test_list_newest_first() {
        let store = create_test_store();
        let first = store.create(&new_post(Role::Parent, "早")).unwrap();
        let second = store.create(&new_post(Role::Parent, "晚")).unwrap();

        let posts = store.list().unwrap();
        assert_eq!(posts[0].id, second);
        assert_eq!(posts[1].id, first);
    }

    #[test]
    fn test_like_and_unlike() {
        let store = create_test_store();
        let id = store.create(&new_post(Role::Parent, "谢谢")).unwrap();

        store.like(id).unwrap();
        store.like(id).unwrap();
        assert_eq!(store.get(id).unwrap().likes, 2);

        store.unlike(id).unwrap();
        store.unlike(id).unwrap();
        store.unlike(id).unwrap();
        assert_eq!(store.get(id).unwrap().likes, 0);
    }

    #[test]
    fn test_like_missing_post() {
        let store = create_test_store();
        assert!(matches!(store.like(7), Err(HeartbridgeError::NotFound(7))));
        assert!(matches!(store.unlike(7), Err(HeartbridgeError::NotFound(7))));
    }

    #[test]
    fn test_count() {
        let store = create_test_store();
        assert_eq!(store.count().unwrap(), 0);
        store
            .create_with_likes(&new_post(Role::Child, "嗯"), 12)
            .unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.list().unwrap()[0].likes, 12);
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2025-03-01T08:30:00+08:00").is_ok());
        let naive = parse_timestamp("2025-03-01 08:30:00.123456").unwrap();
        assert_eq!(naive.to_rfc3339(), "2025-03-01T08:30:00.123456+00:00");
        let sqlite_default = parse_timestamp("2025-03-01 08:30:00").unwrap();
        assert_eq!(sqlite_default.to_rfc3339(), "2025-03-01T08:30:00+00:00");
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_vec_source() {
        let posts = vec![
            new_post(Role::Parent, "a").into_post(1),
            new_post(Role::Child, "b").into_post(2),
        ];
        assert_eq!(posts.list_posts().unwrap().len(), 2);
        assert_eq!(posts.list_posts_by_role(Role::Parent).unwrap()[0].id, 1);
    }
}
