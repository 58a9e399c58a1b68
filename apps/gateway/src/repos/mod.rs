//! Repository capability traits and the factory that binds them to a
//! connection.
//!
//! Services never construct repositories directly. They ask a [`RepoFactory`]
//! for instances bound to whatever connection the operation runs on: the pool
//! for single reads and writes, or a transaction for multi-step writes. Both
//! satisfy the same trait, so transactional code uses the same contract.

use sea_orm::ConnectionTrait;

pub mod articles;
pub mod users;

pub use articles::{Article, ArticleRepo, ArticleRepoSea};
pub use users::{User, UserRepo, UserRepoSea};

/// Builds repositories bound to a connection.
pub trait RepoFactory: Send + Sync + 'static {
    fn users<'c, C>(&self, conn: &'c C) -> Box<dyn UserRepo + 'c>
    where
        C: ConnectionTrait + Send + Sync + 'c;

    fn articles<'c, C>(&self, conn: &'c C) -> Box<dyn ArticleRepo + 'c>
    where
        C: ConnectionTrait + Send + Sync + 'c;
}

/// Production factory backed by SeaORM.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaRepos;

impl RepoFactory for SeaRepos {
    fn users<'c, C>(&self, conn: &'c C) -> Box<dyn UserRepo + 'c>
    where
        C: ConnectionTrait + Send + Sync + 'c,
    {
        Box::new(UserRepoSea::new(conn))
    }

    fn articles<'c, C>(&self, conn: &'c C) -> Box<dyn ArticleRepo + 'c>
    where
        C: ConnectionTrait + Send + Sync + 'c,
    {
        Box::new(ArticleRepoSea::new(conn))
    }
}
