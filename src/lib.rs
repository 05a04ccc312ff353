//! Strata maps tables to entities over a single connection.
//!
//! Columns are introspected from the catalog the first time a table is used, entities track
//! which columns changed since they were read and relationships are resolved by naming
//! convention: `posts.user_id` references `users.id`, `posts_tags` joins `posts` and `tags`.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use strata::{Connection, ModelRegistry, Result, SaveOutcome, Session};
//!
//! async fn rename<C: Connection>(connection: C) -> Result<()> {
//!     let mut registry = ModelRegistry::new();
//!     registry
//!         .associate_table("User", "users")
//!         .associate_table("Post", "posts")
//!         .one_to_many("User", "posts", "Post");
//!     let mut session = Session::new(connection, Arc::new(registry));
//!     let mut user = session.load("User", 1).await?;
//!     user.set("name", "Ada")?;
//!     assert_eq!(session.save(&mut user).await?, SaveOutcome::Updated);
//!     let posts = session.resolve_many(&mut user, "posts", false).await?;
//!     println!("{} posts", posts.len());
//!     Ok(())
//! }
//! ```
pub use strata_core::*;
