mod blog;
mod paging;
mod schema;
mod users;

use crate::{
    blog::{blog, stale_rows},
    paging::paging,
    schema::{registry, setup},
    users::{introspection, users},
};
use log::LevelFilter;
use std::{borrow::Cow, env};
use strata::{Connection, Session};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite on `connection`. `url` is used to check reconnection.
pub async fn execute_tests<C: Connection>(connection: C, url: Cow<'static, str>) {
    let mut session = Session::new(connection, registry());
    setup(&mut session).await;
    introspection(&mut session).await;
    users(&mut session).await;
    blog(&mut session).await;
    stale_rows(&mut session).await;
    paging(&mut session).await;

    let catalog = session.catalog().len();
    session
        .reconnect(url)
        .await
        .expect("Could not reconnect");
    assert!(session.prepared().is_empty());
    assert_eq!(session.catalog().len(), catalog);
    users(&mut session).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
