use crate::{ValueHolder, postgres_type_to_value, util::stream_postgres_row_to_strata_row};
use async_stream::try_stream;
use openssl::ssl::{SslConnector, SslFiletype, SslMethod, SslVerifyMode};
use postgres_openssl::MakeTlsConnector;
use std::{borrow::Cow, collections::HashMap, env, path::Path, pin::pin};
use strata_core::{
    Connection, Context, Error, Result, RowLabeled, Value,
    stream::{Stream, StreamExt},
    truncate_long,
};
use tokio::spawn;
use tokio_postgres::{NoTls, Statement};
use url::Url;
use urlencoding::decode;

/// Connection to a Postgres server.
///
/// Keeps the server side statements it prepared, by name. Parameters are coerced to the types
/// the server inferred for each statement before being bound.
pub struct PostgresConnection {
    pub(crate) client: tokio_postgres::Client,
    pub(crate) statements: HashMap<String, Statement>,
}

impl PostgresConnection {
    pub const PREFIX: &'static str = "postgres://";

    /// Number of statements prepared on this connection.
    pub fn prepared_statements(&self) -> usize {
        self.statements.len()
    }
}

impl Connection for PostgresConnection {
    async fn connect(url: Cow<'static, str>) -> Result<PostgresConnection> {
        let context = || format!("While trying to connect to `{}`", truncate_long!(url));
        let url = decode(&url).with_context(context)?;
        if !url.starts_with(Self::PREFIX) {
            let error = Error::msg(format!(
                "Postgres connection url must start with `{}`",
                Self::PREFIX
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let mut url = Url::parse(&url).with_context(context)?;
        let mut take_url_param = |key: &str, env_var: &str| {
            let mut value = None;
            let mut pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into(), v.into()))
                .collect();
            if let Some(pos) = pairs.iter().position(|(k, _)| k == key) {
                let (_, v) = pairs.remove(pos);
                value = Some(v);
            }
            if pairs.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut()
                    .clear()
                    .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            }
            value.or_else(|| env::var(env_var).ok())
        };
        let sslmode = take_url_param("sslmode", "PGSSLMODE").unwrap_or("disable".into());
        let client = if sslmode == "disable" {
            let (client, connection) = tokio_postgres::connect(url.as_str(), NoTls)
                .await
                .with_context(context)?;
            spawn(async move {
                if let Err(e) = connection.await
                    && !e.is_closed()
                {
                    log::error!("Postgres connection error: {:#}", e);
                }
            });
            client
        } else {
            let mut builder = SslConnector::builder(SslMethod::tls())?;
            if let Some(path) = take_url_param("sslrootcert", "PGSSLROOTCERT")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_ca_file(path)?;
            }
            if let Some(path) = take_url_param("sslcert", "PGSSLCERT")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_certificate_chain_file(path)?;
            }
            if let Some(path) = take_url_param("sslkey", "PGSSLKEY")
                .as_deref()
                .map(Path::new)
                && path.exists()
            {
                builder.set_private_key_file(path, SslFiletype::PEM)?;
            }
            match &*sslmode {
                "require" | "prefer" | "allow" => builder.set_verify(SslVerifyMode::NONE),
                _ => builder.set_verify(SslVerifyMode::PEER),
            }
            let connector = MakeTlsConnector::new(builder.build());
            let (client, connection) = tokio_postgres::connect(url.as_str(), connector)
                .await
                .with_context(context)?;
            spawn(async move {
                if let Err(e) = connection.await
                    && !e.is_closed()
                {
                    log::error!("Postgres connection error: {:#}", e);
                }
            });
            client
        };
        Ok(Self {
            client,
            statements: HashMap::new(),
        })
    }

    async fn prepare(&mut self, name: &str, sql: &str) -> Result<()> {
        let sql = sql.trim_end().trim_end_matches(';');
        let statement = self
            .client
            .prepare(sql)
            .await
            .with_context(|| format!("While preparing `{}`:\n{}", name, truncate_long!(sql)))?;
        self.statements.insert(name.to_owned(), statement);
        Ok(())
    }

    fn execute_prepared(
        &mut self,
        name: &str,
        params: Vec<Value>,
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        try_stream! {
            let statement = self.statements.get(name).cloned().ok_or_else(|| {
                Error::msg(format!("No statement named `{}` was prepared on this connection", name))
            })?;
            let types = statement.params();
            if types.len() != params.len() {
                Err::<(), _>(Error::msg(format!(
                    "Statement `{}` expects {} parameters, {} were given",
                    name,
                    types.len(),
                    params.len()
                )))?;
            }
            let params = params
                .into_iter()
                .zip(types)
                .enumerate()
                .map(|(i, (value, ty))| {
                    value
                        .try_as(&postgres_type_to_value(ty))
                        .map(ValueHolder)
                        .with_context(|| format!("While binding parameter ${} of `{}`", i + 1, name))
                })
                .collect::<Result<Vec<_>>>()?;
            let rows = self
                .client
                .query_raw(&statement, params)
                .await
                .with_context(|| format!("While executing `{}`", name))?;
            let mut rows = pin!(stream_postgres_row_to_strata_row(rows));
            while let Some(row) = rows.next().await.transpose()? {
                yield row;
            }
        }
    }
}
