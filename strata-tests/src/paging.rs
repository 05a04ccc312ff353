use crate::silent_logs;
use strata::{Connection, OrmError, Page, Session};

pub async fn paging<C: Connection>(session: &mut Session<C>) {
    for label in ["alpha", "bravo", "charlie", "delta", "echo"] {
        let mut tag = session.create("Tag").await.unwrap();
        tag.set("label", label).unwrap();
        session.save(&mut tag).await.expect("Could not save a tag");
    }

    let page = Page::new(1, 2).order_by(["label DESC"]).unwrap();
    let tags = session.page("Tag", &page).await.expect("Could not page tags");
    let labels: Vec<String> = tags.iter().map(|v| v.get_as("label").unwrap()).collect();
    assert_eq!(labels, ["science fiction", "poetry"]);
    assert!(tags.iter().all(|v| v.is_persisted()));

    let page = Page::new(2, 3).order_by(["label asc", "id"]).unwrap();
    let tags = session.page("Tag", &page).await.expect("Could not page tags");
    let labels: Vec<String> = tags.iter().map(|v| v.get_as("label").unwrap()).collect();
    assert_eq!(labels, ["delta", "echo", "gothic"]);

    let tags = session
        .page("Tag", &Page::new(100, 10))
        .await
        .expect("Could not read an empty page");
    assert!(tags.is_empty());

    let mut previous = 0;
    for tag in session
        .page("Tag", &Page::new(1, 100))
        .await
        .expect("Could not page by key")
    {
        let id: i32 = tag.get_as("id").unwrap();
        assert!(id > previous);
        previous = id;
    }

    silent_logs! {
        let page = Page::new(1, 2).order_by(["colour DESC"]).unwrap();
        let error = session.page("Tag", &page).await.expect_err("No such column");
        assert!(matches!(OrmError::of(&error), Some(OrmError::Configuration(..))));
    }
}
