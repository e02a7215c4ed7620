//! Benchmark harness helpers.

use lazyq_value::Row;
use tracing::info;

use crate::fixtures::{
    generate_posts, generate_users, post_to_row, user_to_row, PostData, Scale, UserData,
};

/// Install a tracing subscriber driven by `RUST_LOG`.
///
/// Safe to call from every benchmark; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Users and their posts, generated once per benchmark group.
pub struct BlogData {
    pub users: Vec<UserData>,
    pub posts: Vec<PostData>,
}

impl BlogData {
    /// Generate a data set at the given scale.
    pub fn with_scale(scale: Scale) -> Self {
        let users = generate_users(scale.count());
        let user_ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let posts = generate_posts(scale.count() * scale.posts_per_user(), &user_ids);

        info!(
            ?scale,
            users = users.len(),
            posts = posts.len(),
            "generated benchmark data"
        );

        Self { users, posts }
    }

    pub fn user_rows(&self) -> Vec<Row> {
        self.users.iter().map(user_to_row).collect()
    }

    pub fn post_rows(&self) -> Vec<Row> {
        self.posts.iter().map(post_to_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiny_scale() {
        let data = BlogData::with_scale(Scale::Tiny);
        assert_eq!(data.users.len(), 10);
        assert_eq!(data.posts.len(), 20);
        assert_eq!(data.post_rows().len(), 20);
    }
}
