use crate::ValueHolder;
use async_stream::try_stream;
use std::pin::pin;
use strata_core::{
    Error, Row, RowLabeled, RowNames,
    stream::{Stream, StreamExt},
};

pub(crate) fn row_to_strata_row(row: tokio_postgres::Row) -> strata_core::Result<Row> {
    (0..row.len())
        .map(|i| match row.try_get::<_, ValueHolder>(i) {
            Ok(v) => Ok(v.0),
            Err(e) => {
                let col = &row.columns()[i];
                Err(Error::new(e).context(format!(
                    "Could not deserialize column {} `{}`: {}",
                    i,
                    col.name(),
                    col.type_()
                )))
            }
        })
        .collect()
}

/// Labels every row of `stream`, the label list is shared by all the rows.
pub(crate) fn stream_postgres_row_to_strata_row(
    stream: impl Stream<Item = Result<tokio_postgres::Row, tokio_postgres::Error>> + Send,
) -> impl Stream<Item = strata_core::Result<RowLabeled>> + Send {
    try_stream! {
        let mut stream = pin!(stream);
        let mut labels: Option<RowNames> = None;
        while let Some(row) = stream.next().await.transpose()? {
            let labels = labels.get_or_insert_with(|| {
                row.columns().iter().map(|c| c.name().to_string()).collect()
            });
            yield RowLabeled::new(labels.clone(), row_to_strata_row(row)?);
        }
    }
}
