use crate::{Result, RowLabeled, Value, stream::Stream};
use futures::TryStreamExt;
use std::{borrow::Cow, future::Future};

/// Transport to a database server: the only thing a driver must provide.
///
/// Statements are addressed by name. A name is prepared once per connection and executed many
/// times, the server keeps the plan.
pub trait Connection: Send {
    /// Establish a connection from a driver specific URL.
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>> + Send
    where
        Self: Sized;

    /// Prepare `sql` on the server under `name`.
    fn prepare(&mut self, name: &str, sql: &str) -> impl Future<Output = Result<()>> + Send;

    /// Execute the statement previously prepared under `name`, binding `params` positionally.
    fn execute_prepared(
        &mut self,
        name: &str,
        params: Vec<Value>,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send;

    /// Execute and collect every row.
    fn fetch_all(
        &mut self,
        name: &str,
        params: Vec<Value>,
    ) -> impl Future<Output = Result<Vec<RowLabeled>>> + Send {
        self.execute_prepared(name, params).try_collect()
    }
}
