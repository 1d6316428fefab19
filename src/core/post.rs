use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{HeartbridgeError, Result};

/// Author cohort of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Child,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Parent, Role::Child];

    /// Stable ASCII key used in reports and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Child => "child",
        }
    }

    /// Label stored in the `posts.role` column
    pub fn label(&self) -> &'static str {
        match self {
            Role::Parent => "家长",
            Role::Child => "孩子",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = HeartbridgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "parent" | "家长" => Ok(Role::Parent),
            "child" | "孩子" => Ok(Role::Child),
            other => Err(HeartbridgeError::InvalidRole(other.to_string())),
        }
    }
}

/// A forum post as read back from storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_role: Role,
    pub nickname: String,
    pub title: String,
    pub content: String,

    /// Hide the nickname when displaying ("tree hole" mode)
    pub is_hidden: bool,

    pub created_at: DateTime<Utc>,
    pub likes: u32,
}

impl Post {
    /// Name shown next to the post; hidden posts only reveal the cohort
    pub fn display_name(&self) -> String {
        if self.is_hidden {
            format!("某位{}", self.author_role.label())
        } else {
            self.nickname.clone()
        }
    }
}

/// A post that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_role: Role,
    pub nickname: String,
    pub title: String,
    pub content: String,
    pub is_hidden: bool,
}

impl NewPost {
    pub fn new(author_role: Role, nickname: &str, title: &str, content: &str) -> Self {
        Self {
            author_role,
            nickname: nickname.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            is_hidden: false,
        }
    }

    pub fn hidden(mut self, is_hidden: bool) -> Self {
        self.is_hidden = is_hidden;
        self
    }

    /// Title and content must both have visible text
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err(HeartbridgeError::InvalidPost(
                "title and content must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Materialize as a `Post` without touching storage
    pub fn into_post(self, id: i64) -> Post {
        Post {
            id,
            author_role: self.author_role,
            nickname: self.nickname,
            title: self.title,
            content: self.content,
            is_hidden: self.is_hidden,
            created_at: Utc::now(),
            likes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("parent".parse::<Role>().unwrap(), Role::Parent);
        assert_eq!("Child".parse::<Role>().unwrap(), Role::Child);
        assert_eq!("家长".parse::<Role>().unwrap(), Role::Parent);
        assert_eq!("孩子".parse::<Role>().unwrap(), Role::Child);
        assert!(matches!(
            "grandparent".parse::<Role>(),
            Err(HeartbridgeError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_validate_requires_title_and_content() {
        assert!(NewPost::new(Role::Parent, "园丁", "标题", "内容").validate().is_ok());
        for (title, content) in [("", "内容"), ("标题", ""), ("  ", "内容"), ("标题", "\n\t")] {
            assert!(matches!(
                NewPost::new(Role::Parent, "园丁", title, content).validate(),
                Err(HeartbridgeError::InvalidPost(_))
            ));
        }
    }

    #[test]
    fn test_display_name_hidden() {
        let post = NewPost::new(Role::Child, "追梦的考拉", "标题", "内容")
            .hidden(true)
            .into_post(1);
        assert_eq!(post.display_name(), "某位孩子");

        let post = NewPost::new(Role::Parent, "温暖的大树", "标题", "内容").into_post(2);
        assert_eq!(post.display_name(), "温暖的大树");
    }
}
