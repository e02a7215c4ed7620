//! Integration tests for lazy query pipelines.

use std::cell::Cell;
use std::collections::HashMap;

use lazyq_core::query::{JoinKind, MapPolicy, Pair};
use lazyq_core::{Error, JoinConfig, Key, Row, Sequence, Value};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
struct User {
    id: i64,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Post {
    id: i64,
    author_id: i64,
    title: String,
    tags: Vec<String>,
}

lazyq_core::impl_record!(User, Post);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn users() -> Vec<User> {
    [(1, "ada"), (2, "grace"), (3, "linus")]
        .into_iter()
        .map(|(id, name)| User {
            id,
            name: name.to_string(),
        })
        .collect()
}

fn posts() -> Vec<Post> {
    let post = |id, author_id, title: &str, tags: &[&str]| Post {
        id,
        author_id,
        title: title.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    };

    vec![
        post(10, 1, "hello", &["rust", "intro"]),
        post(11, 3, "kernel", &["c"]),
        post(12, 1, "again", &[]),
        post(13, 99, "orphan", &["misc"]),
    ]
}

fn authored(kind: JoinKind) -> Vec<(Option<String>, Option<String>)> {
    Sequence::from_vec(users())
        .join_vec(posts())
        .with_config(JoinConfig::new(kind))
        .on_this(|u| u.id)
        .equals_this(|p| p.author_id)
        .as_this(|u, p| (u.map(|u| u.name), p.map(|p| p.title)))
        .try_to_vec()
        .unwrap()
}

fn row(user: &str, post: &str) -> (Option<String>, Option<String>) {
    (Some(user.to_string()), Some(post.to_string()))
}

#[test]
fn test_inner_join_users_posts() {
    init_tracing();

    assert_eq!(
        authored(JoinKind::Inner),
        vec![row("ada", "hello"), row("ada", "again"), row("linus", "kernel")]
    );
}

#[test]
fn test_left_join_keeps_users_without_posts() {
    init_tracing();

    assert_eq!(
        authored(JoinKind::Left),
        vec![
            row("ada", "hello"),
            row("ada", "again"),
            (Some("grace".to_string()), None),
            row("linus", "kernel"),
        ]
    );
}

#[test]
fn test_right_join_keeps_orphan_posts() {
    init_tracing();

    assert_eq!(
        authored(JoinKind::Right),
        vec![
            row("ada", "hello"),
            row("ada", "again"),
            row("linus", "kernel"),
            (None, Some("orphan".to_string())),
        ]
    );
}

#[test]
fn test_full_outer_join() {
    init_tracing();

    let rows = authored(JoinKind::FullOuter);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[2], (Some("grace".to_string()), None));
    assert_eq!(rows[4], (None, Some("orphan".to_string())));
}

#[test]
fn test_named_field_join_matches_closure_join() {
    init_tracing();

    let named = Sequence::from_vec(users())
        .left_join_vec(posts())
        .on("id")
        .equals("author_id")
        .as_this(|u, p| (u.map(|u| u.name), p.map(|p| p.title)))
        .try_to_vec()
        .unwrap();

    assert_eq!(named, authored(JoinKind::Left));
}

#[test]
fn test_join_against_dynamic_rows() {
    init_tracing();

    let scores = vec![
        serde_json::json!({ "user_id": 3, "score": 9 }),
        serde_json::json!({ "user_id": 1, "score": 4 }),
    ];

    let joined = Sequence::from_vec(users())
        .join_vec(scores)
        .on("id")
        .equals("user_id")
        .as_pairs()
        .try_project(|pair: Pair<User, serde_json::Value>| {
            let user = pair.left.map(|u| u.name);
            let score = pair.right.and_then(|r| r["score"].as_i64());
            (user, score)
        })
        .try_to_vec()
        .unwrap();

    assert_eq!(
        joined,
        vec![(Some("ada".to_string()), Some(4)), (Some("linus".to_string()), Some(9))]
    );
}

#[test]
fn test_join_on_missing_field_fails_at_first_pull() {
    init_tracing();

    let mut seq = Sequence::from_vec(users())
        .join_vec(posts())
        .on("email")
        .equals("author_id")
        .as_pairs();

    match seq.next() {
        Some(Err(Error::FieldNotFound { field, .. })) => assert_eq!(field, "email"),
        other => panic!("expected missing field, got {other:?}"),
    }
    assert!(seq.next().is_none());
}

#[test]
fn test_join_pulls_left_side_on_demand() {
    init_tracing();

    let pulls = Cell::new(0);
    let source = users();
    let mut remaining = source.into_iter();
    let left = Sequence::from_fn(|| {
        pulls.set(pulls.get() + 1);
        remaining.next()
    });

    let first = left
        .join_vec(posts())
        .on_this(|u| u.id)
        .equals_this(|p| p.author_id)
        .as_pairs()
        .take(1)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(pulls.get(), 1);
}

#[test]
fn test_flatten_post_tags() {
    let tags = Sequence::from_vec(posts())
        .flatten_field("tags")
        .try_to_vec()
        .unwrap();

    assert_eq!(
        tags,
        vec![
            Value::from("rust"),
            Value::from("intro"),
            Value::from("c"),
            Value::from("misc"),
        ]
    );
}

#[test]
fn test_join_then_flatten_then_group() {
    init_tracing();

    let tagged = Sequence::from_vec(users())
        .join_vec(posts())
        .on_this(|u| u.id)
        .equals_this(|p| p.author_id)
        .as_this(|u, p| (u, p))
        .try_project(|(u, p)| {
            let name = u.map(|u| u.name).unwrap_or_default();
            let tags = p.map(|p| p.tags).unwrap_or_default();
            (name, tags)
        })
        .try_to_vec()
        .unwrap();

    let mut tags_by_user = HashMap::new();
    Sequence::from_vec(tagged)
        .flatten_with(|(name, tags)| {
            Sequence::new(tags.into_iter().map(move |tag| (name.clone(), tag)))
        })
        .group_lists_of(|(_, tag)| tag)
        .by(|(name, _)| name.clone())
        .assign_to_list_map(&mut tags_by_user)
        .unwrap();

    assert_eq!(tags_by_user.len(), 2);
    assert_eq!(tags_by_user["ada"], vec!["rust", "intro"]);
    assert_eq!(tags_by_user["linus"], vec!["c"]);
}

#[test]
fn test_group_posts_by_author_field() {
    init_tracing();

    let grouped = Sequence::from_vec(posts())
        .group_lists_of_field("title")
        .by_field("author_id");
    assert_eq!(grouped.policy(), MapPolicy::Accumulate);

    let mut titles = HashMap::new();
    grouped.assign_to_list_map(&mut titles).unwrap();

    assert_eq!(
        titles[&Key::Int(1)],
        vec![Value::from("hello"), Value::from("again")]
    );
    assert_eq!(titles[&Key::Int(99)], vec![Value::from("orphan")]);
}

#[test]
fn test_self_join_on_rows() {
    let rows = vec![
        Row::new().with_field("id", 1i32).with_field("parent", 0i32),
        Row::new().with_field("id", 2i32).with_field("parent", 1i32),
        Row::new().with_field("id", 3i32).with_field("parent", 1i32),
    ];

    let children = Sequence::from_vec(rows.clone())
        .join_vec(rows)
        .on("id")
        .equals("parent")
        .as_this(|parent, child| {
            let parent = parent.and_then(|r| r.get("id").and_then(Value::as_i64));
            let child = child.and_then(|r| r.get("id").and_then(Value::as_i64));
            (parent, child)
        })
        .try_to_vec()
        .unwrap();

    assert_eq!(children, vec![(Some(1), Some(2)), (Some(1), Some(3))]);
}
