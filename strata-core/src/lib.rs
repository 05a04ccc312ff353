mod as_value;
mod catalog;
mod column;
mod connection;
mod entity;
mod error;
mod inflection;
mod prepared;
mod query;
mod quote;
mod registry;
mod relations;
mod session;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use catalog::*;
pub use column::*;
pub use connection::*;
pub use entity::*;
pub use error::*;
pub use inflection::*;
pub use prepared::*;
pub use query::*;
pub use quote::*;
pub use registry::*;
pub use relations::*;
pub use session::*;
pub use statement::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
