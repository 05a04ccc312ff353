use indoc::indoc;
use std::sync::Arc;
use strata::{Connection, ModelRegistry, Session};

const SETUP: [(&str, &str); 6] = [
    (
        "_setup_drop",
        "DROP TABLE IF EXISTS posts_tags, comments, posts, tags, users CASCADE",
    ),
    (
        "_setup_users",
        indoc! {r#"
            CREATE TABLE users (
                id SERIAL PRIMARY KEY,
                name VARCHAR(60) NOT NULL,
                email TEXT,
                active BOOLEAN,
                balance NUMERIC(10, 2),
                born DATE,
                "lastSeen" TIMESTAMP
            )
        "#},
    ),
    (
        "_setup_posts",
        indoc! {"
            CREATE TABLE posts (
                id SERIAL PRIMARY KEY,
                user_id INTEGER REFERENCES users(id),
                title TEXT NOT NULL,
                body TEXT
            )
        "},
    ),
    (
        "_setup_tags",
        "CREATE TABLE tags (id SERIAL PRIMARY KEY, label TEXT NOT NULL)",
    ),
    (
        "_setup_posts_tags",
        indoc! {"
            CREATE TABLE posts_tags (
                post_id INTEGER REFERENCES posts(id) ON DELETE CASCADE,
                tag_id INTEGER REFERENCES tags(id),
                PRIMARY KEY (post_id, tag_id)
            )
        "},
    ),
    (
        "_setup_comments",
        indoc! {"
            CREATE TABLE comments (
                id BIGSERIAL PRIMARY KEY,
                post_id INTEGER REFERENCES posts(id) ON DELETE CASCADE,
                content TEXT
            )
        "},
    ),
];

pub fn registry() -> Arc<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    registry
        .associate_table("User", "users")
        .associate_table("Post", "posts")
        .associate_table("Tag", "tags")
        .associate_table("PostTag", "posts_tags")
        .associate_table("Comment", "comments")
        .associate_table("Ghost", "ghosts")
        .one_to_many("User", "posts", "Post")
        .many_to_one("Post", "author", "User")
        .many_to_many("Post", "tags", "Tag")
        .many_to_many("Tag", "posts", "Post")
        .one_to_many("Post", "comments", "Comment")
        .many_to_one("Comment", "post", "Post");
    Arc::new(registry)
}

pub async fn setup<C: Connection>(session: &mut Session<C>) {
    for (name, sql) in SETUP {
        session
            .query(name, Some(sql), vec![])
            .await
            .unwrap_or_else(|e| panic!("Failed to run `{}`: {:#}", name, e));
    }
}
