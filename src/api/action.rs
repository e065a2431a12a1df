use std::{fmt, str::FromStr};

use crate::error::Error;

/// 后端支持的全部 action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GetAllPosts,
    GetPostBySlug,
    AuthImageKit,
    GetSystemStatus,
    CreatePost,
    UpdatePost,
    DeletePost,
    LogMedia,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::GetAllPosts,
        Action::GetPostBySlug,
        Action::AuthImageKit,
        Action::GetSystemStatus,
        Action::CreatePost,
        Action::UpdatePost,
        Action::DeletePost,
        Action::LogMedia,
    ];

    /// 查询参数 `action` 中的名称
    pub fn name(self) -> &'static str {
        match self {
            Action::GetAllPosts => "getAllPosts",
            Action::GetPostBySlug => "getPostBySlug",
            Action::AuthImageKit => "authImageKit",
            Action::GetSystemStatus => "getSystemStatus",
            Action::CreatePost => "createPost",
            Action::UpdatePost => "updatePost",
            Action::DeletePost => "deletePost",
            Action::LogMedia => "logMedia",
        }
    }

    /// 读操作走 GET，写操作走 POST 并携带 JSON 请求体
    pub fn is_read(self) -> bool {
        matches!(
            self,
            Action::GetAllPosts
                | Action::GetPostBySlug
                | Action::AuthImageKit
                | Action::GetSystemStatus
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::InvalidAction(s.to_string()))
    }
}
