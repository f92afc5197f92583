use serde::Serialize;

/// Posts and comments share one toggle contract; this enum carries the table
/// and column names that differ between the two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteKind {
    Post,
    Comment,
}

impl VoteKind {
    pub fn item_table(self) -> &'static str {
        match self {
            VoteKind::Post => "posts",
            VoteKind::Comment => "comments",
        }
    }

    pub fn ledger_table(self) -> &'static str {
        match self {
            VoteKind::Post => "post_upvotes",
            VoteKind::Comment => "comment_likes",
        }
    }

    pub fn item_column(self) -> &'static str {
        match self {
            VoteKind::Post => "post_id",
            VoteKind::Comment => "comment_id",
        }
    }

    pub fn count_column(self) -> &'static str {
        match self {
            VoteKind::Post => "upvotes_count",
            VoteKind::Comment => "likes_count",
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            VoteKind::Post => "Post",
            VoteKind::Comment => "Comment",
        }
    }
}

// Vote toggle response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub voted: bool,
    pub new_count: i32,
}
