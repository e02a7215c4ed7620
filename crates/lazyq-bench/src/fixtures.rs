//! Test data generation for benchmarks.
//!
//! Generators are seeded so every run sees the same data.

use lazyq_value::{Row, Value};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    /// 10 users. Use for quick iteration.
    Tiny,
    /// 100 users.
    Small,
    /// 2,000 users.
    #[default]
    Medium,
    /// 100,000 users.
    Large,
}

impl Scale {
    /// Number of users at this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 10,
            Scale::Small => 100,
            Scale::Medium => 2_000,
            Scale::Large => 100_000,
        }
    }

    /// Posts generated per user.
    pub fn posts_per_user(&self) -> usize {
        match self {
            Scale::Tiny => 2,
            Scale::Small | Scale::Medium => 5,
            Scale::Large => 10,
        }
    }
}

/// User data for benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub status: String,
}

/// Post data for benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostData {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub views: i64,
    pub published: bool,
    pub tags: Vec<String>,
}

lazyq_core::impl_record!(UserData, PostData);

/// Every this many posts, one points at an author that does not exist.
const ORPHAN_EVERY: usize = 10;

fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Generate users with ids `0..count`.
pub fn generate_users(count: usize) -> Vec<UserData> {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);

    let statuses = ["active", "inactive", "pending", "admin"];
    let name_prefixes = [
        "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
    ];

    (0..count)
        .map(|i| UserData {
            id: i as i64,
            name: format!("{}_{}", name_prefixes[i % name_prefixes.len()], i),
            email: format!("user{}@example{}.com", i, i % 10),
            age: 18 + (rng.gen::<u32>() % 60) as i32,
            status: statuses[i % statuses.len()].to_string(),
        })
        .collect()
}

/// Generate posts spread round-robin over `user_ids`, with a share of
/// orphans whose author is missing.
pub fn generate_posts(count: usize, user_ids: &[i64]) -> Vec<PostData> {
    const SEED: u64 = 54321;
    let mut rng = StdRng::seed_from_u64(SEED);

    let tag_pool = ["rust", "db", "query", "lazy", "join", "bench"];

    (0..count)
        .map(|i| {
            let author_id = if i % ORPHAN_EVERY == ORPHAN_EVERY - 1 || user_ids.is_empty() {
                -(i as i64) - 1
            } else {
                user_ids[i % user_ids.len()]
            };
            let tag_count = rng.gen_range(0..4);
            let tags = (0..tag_count)
                .map(|_| tag_pool[rng.gen_range(0..tag_pool.len())].to_string())
                .collect();

            PostData {
                id: i as i64,
                title: format!("Post Title {}: {}", i, random_string(&mut rng, 20)),
                author_id,
                views: rng.gen::<i64>().abs() % 1_000_000,
                published: rng.gen_bool(0.8),
                tags,
            }
        })
        .collect()
}

/// Convert a user to a dynamic row.
pub fn user_to_row(user: &UserData) -> Row {
    Row::new()
        .with_field("id", user.id)
        .with_field("name", user.name.as_str())
        .with_field("email", user.email.as_str())
        .with_field("age", user.age)
        .with_field("status", user.status.as_str())
}

/// Convert a post to a dynamic row.
pub fn post_to_row(post: &PostData) -> Row {
    let tags = post.tags.iter().map(|t| Value::from(t.as_str())).collect::<Vec<_>>();
    Row::new()
        .with_field("id", post.id)
        .with_field("title", post.title.as_str())
        .with_field("author_id", post.author_id)
        .with_field("views", post.views)
        .with_field("published", post.published)
        .with_field("tags", tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_are_deterministic() {
        let users = generate_users(20);
        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();

        assert_eq!(generate_users(20), users);
        assert_eq!(generate_posts(50, &ids), generate_posts(50, &ids));
    }

    #[test]
    fn test_posts_include_orphans() {
        let ids: Vec<i64> = generate_users(5).iter().map(|u| u.id).collect();
        let posts = generate_posts(30, &ids);

        let orphans = posts.iter().filter(|p| p.author_id < 0).count();
        assert_eq!(orphans, 3);
    }

    #[test]
    fn test_row_conversion() {
        let user = &generate_users(1)[0];
        let row = user_to_row(user);
        assert_eq!(row.get("id"), Some(&Value::Int64(0)));
        assert_eq!(row.len(), 5);
    }
}
