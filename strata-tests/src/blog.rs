use crate::silent_logs;
use strata::{Connection, Entity, OrmError, Session, Value};

async fn post<C: Connection>(session: &mut Session<C>, author: &Entity, title: &str) -> Entity {
    let mut post = session.create("Post").await.expect("Could not create a post");
    post.set("user_id", author.get("id").unwrap().clone())
        .expect("Set user_id");
    post.set("title", title).expect("Set title");
    session.save(&mut post).await.expect("Could not save a post");
    post
}

async fn tag<C: Connection>(session: &mut Session<C>, label: &str) -> Entity {
    let mut tag = session.create("Tag").await.expect("Could not create a tag");
    tag.set("label", label).expect("Set label");
    session.save(&mut tag).await.expect("Could not save a tag");
    tag
}

fn titles(posts: &[Entity]) -> Vec<String> {
    let mut titles: Vec<String> = posts
        .iter()
        .map(|v| v.get_as("title").expect("Post title"))
        .collect();
    titles.sort();
    titles
}

pub async fn blog<C: Connection>(session: &mut Session<C>) {
    let mut author = session.create("User").await.expect("Could not create");
    author.set("name", "Mary Shelley").unwrap();
    session.save(&mut author).await.expect("Could not save author");

    silent_logs! {
        let mut draft = session.create("Post").await.unwrap();
        let error = session
            .resolve_many(&mut draft, "comments", false)
            .await
            .expect_err("An unsaved post has no comments");
        assert!(matches!(OrmError::of(&error), Some(OrmError::Unsaved { .. })));
    }

    let mut first = post(session, &author, "Frankenstein").await;
    post(session, &author, "The Last Man").await;

    // One to many, cached until forced
    let posts = session
        .resolve_many(&mut author, "posts", false)
        .await
        .expect("Could not resolve posts");
    assert_eq!(titles(posts), ["Frankenstein", "The Last Man"]);
    post(session, &author, "Mathilda").await;
    let posts = session
        .resolve_many(&mut author, "posts", false)
        .await
        .expect("Could not resolve cached posts");
    assert_eq!(posts.len(), 2);
    let posts = session
        .resolve_many(&mut author, "posts", true)
        .await
        .expect("Could not force posts");
    assert_eq!(titles(posts), ["Frankenstein", "Mathilda", "The Last Man"]);
    assert_eq!(
        author
            .association("posts")
            .and_then(|v| v.as_many())
            .map(<[Entity]>::len),
        Some(3)
    );

    // Many to one
    let found = session
        .resolve_one(&mut first, "author", false)
        .await
        .expect("Could not resolve the author");
    assert_eq!(found.get_as::<String>("name").unwrap(), "Mary Shelley");
    assert_eq!(found.entity_type(), "User");

    // Many to many through posts_tags
    let gothic = tag(session, "gothic").await;
    let science = tag(session, "science fiction").await;
    tag(session, "poetry").await;
    let post_id = first.get("id").unwrap().clone();
    for tag in [&gothic, &science] {
        session
            .query(
                "_link_post_tag",
                Some("INSERT INTO posts_tags (post_id, tag_id) VALUES ($1, $2)"),
                vec![post_id.clone(), tag.get("id").unwrap().clone()],
            )
            .await
            .expect("Could not link a tag");
    }
    let tags = session
        .resolve_many(&mut first, "tags", false)
        .await
        .expect("Could not resolve tags");
    let mut labels: Vec<String> = tags.iter().map(|v| v.get_as("label").unwrap()).collect();
    labels.sort();
    assert_eq!(labels, ["gothic", "science fiction"]);
    assert!(tags.iter().all(|v| v.entity_type() == "Tag"));

    let mut gothic = gothic;
    let posts = session
        .resolve_many(&mut gothic, "posts", false)
        .await
        .expect("Could not resolve the posts of a tag");
    assert_eq!(titles(posts), ["Frankenstein"]);

    let link = session
        .load_composite("PostTag", &[post_id.clone(), gothic.get("id").unwrap().clone()])
        .await
        .expect("Could not load a link row");
    assert_eq!(link.get("post_id").unwrap(), &post_id);

    let rows = session
        .query_positional(
            "_count_posts_tags",
            Some("SELECT COUNT(*) FROM posts_tags WHERE post_id = $1"),
            vec![post_id.clone()],
        )
        .await
        .expect("Could not count");
    assert_eq!(rows[0][0], Value::Int64(Some(2)));

    // A comment without a post
    let mut comment = session.create("Comment").await.unwrap();
    comment.set("content", "Orphan").unwrap();
    session.save(&mut comment).await.expect("Could not save comment");
    silent_logs! {
        let error = session
            .resolve_one(&mut comment, "post", false)
            .await
            .expect_err("The comment has no post");
        assert!(matches!(OrmError::of(&error), Some(OrmError::NotFound { .. })));
    }
    comment.set("post_id", first.get("id").unwrap().clone()).unwrap();
    session.save(&mut comment).await.expect("Could not attach comment");
    let parent = session
        .resolve_one(&mut comment, "post", false)
        .await
        .expect("Could not resolve the post of a comment");
    assert_eq!(parent.get_as::<String>("title").unwrap(), "Frankenstein");
    let comments = session
        .resolve_many(&mut first, "comments", false)
        .await
        .expect("Could not resolve comments");
    assert_eq!(comments.len(), 1);
}

pub async fn stale_rows<C: Connection>(session: &mut Session<C>) {
    let mut author = session.create("User").await.unwrap();
    author.set("name", "Bram Stoker").unwrap();
    session.save(&mut author).await.unwrap();
    let mut post = post(session, &author, "Dracula").await;
    session
        .query(
            "_delete_post",
            Some("DELETE FROM posts WHERE id = $1"),
            vec![post.get("id").unwrap().clone()],
        )
        .await
        .expect("Could not delete the post");
    post.set("body", "Lost").unwrap();
    silent_logs! {
        let error = session.save(&mut post).await.expect_err("The row is gone");
        assert!(matches!(OrmError::of(&error), Some(OrmError::StaleEntity { .. })));
    }
}
