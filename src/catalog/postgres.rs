//! PostgreSQL catalog backend reading `information_schema`.

use super::{CatalogError, ColumnDescriptor, ConstraintDescriptor, MetadataProvider};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tokio_postgres::Client;

const LIST_TABLES: &str = "SELECT DISTINCT table_name::text
FROM information_schema.tables
WHERE table_schema = $1
ORDER BY 1 ASC";

const LIST_COLUMNS: &str = "SELECT
    c.column_name::text,
    c.data_type::text,
    c.is_nullable::text,
    c.column_default::text
FROM information_schema.columns c
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position";

// kcu2 is matched on ordinal position so each column of a composite foreign
// key maps to the referenced column at the same position.
const LIST_CONSTRAINTS: &str = "SELECT
    tc.constraint_schema::text,
    tc.constraint_name::text,
    tc.constraint_type::text,
    kcu1.column_name::text,
    kcu2.table_schema::text,
    kcu2.table_name::text,
    kcu2.column_name::text
FROM information_schema.table_constraints tc
LEFT OUTER JOIN information_schema.referential_constraints rc
    USING (constraint_schema, constraint_name)
JOIN information_schema.key_column_usage kcu1
    ON  kcu1.constraint_catalog = tc.constraint_catalog
    AND kcu1.constraint_schema  = tc.constraint_schema
    AND kcu1.constraint_name    = tc.constraint_name
LEFT OUTER JOIN information_schema.key_column_usage kcu2
    ON  kcu2.constraint_catalog = rc.unique_constraint_catalog
    AND kcu2.constraint_schema  = rc.unique_constraint_schema
    AND kcu2.constraint_name    = rc.unique_constraint_name
    AND kcu2.ordinal_position   = kcu1.ordinal_position
WHERE tc.table_schema = $1 AND tc.table_name = $2
ORDER BY tc.constraint_name, kcu1.ordinal_position";

/// Catalog backed by a live PostgreSQL connection.
///
/// The blocking [`MetadataProvider`] calls drive a private runtime. Every
/// query races the interrupt channel, so Ctrl-C makes the in-flight call (and
/// every later one) return [`CatalogError::Cancelled`].
pub struct PostgresCatalog {
    runtime: Runtime,
    client: Client,
    interrupted: watch::Receiver<bool>,
}

impl PostgresCatalog {
    /// Connect using a `postgres://` or `postgresql://` URL.
    ///
    /// TLS follows the URL's `sslmode`: `disable` never encrypts, `prefer`
    /// (the default) encrypts when the server offers it, `require` fails
    /// without it. Server certificates are verified against the system roots.
    pub fn connect(url: &str) -> Result<Self, CatalogError> {
        let scheme = url.split("://").next().unwrap_or_default();
        if !matches!(scheme, "postgres" | "postgresql") {
            return Err(CatalogError::UnsupportedScheme(scheme.to_string()));
        }
        let tls = MakeTlsConnector::new(TlsConnector::new().map_err(CatalogError::Tls)?);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(CatalogError::Runtime)?;

        let (tx, interrupted) = watch::channel(false);
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling catalog queries");
                let _ = tx.send(true);
            }
        });

        let mut cancel = interrupted.clone();
        let client = runtime.block_on(async {
            tokio::select! {
                connected = tokio_postgres::connect(url, tls) => {
                    let (client, connection) = connected.map_err(CatalogError::Connect)?;
                    // Keep connection alive in background task
                    tokio::spawn(async move {
                        if let Err(e) = connection.await {
                            tracing::error!(error = %e, "database connection error");
                        }
                    });
                    Ok::<_, CatalogError>(client)
                }
                Ok(_) = cancel.wait_for(|stop| *stop) => Err(CatalogError::Cancelled),
            }
        })?;

        Ok(Self {
            runtime,
            client,
            interrupted,
        })
    }

    fn run<T>(
        &self,
        query: impl Future<Output = Result<T, CatalogError>>,
    ) -> Result<T, CatalogError> {
        let mut cancel = self.interrupted.clone();
        self.runtime.block_on(async move {
            tokio::select! {
                biased;
                Ok(_) = cancel.wait_for(|stop| *stop) => Err(CatalogError::Cancelled),
                result = query => result,
            }
        })
    }
}

fn query_error(what: &'static str) -> impl FnOnce(tokio_postgres::Error) -> CatalogError {
    move |source| CatalogError::Query { what, source }
}

impl MetadataProvider for PostgresCatalog {
    fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.run(async {
            let rows = self
                .client
                .query(LIST_TABLES, &[&schema])
                .await
                .map_err(query_error("tables"))?;
            rows.iter()
                .map(|row| row.try_get::<_, String>(0))
                .collect::<Result<Vec<String>, _>>()
                .map_err(query_error("tables"))
        })
    }

    fn list_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        self.run(async {
            let rows = self
                .client
                .query(LIST_COLUMNS, &[&schema, &table])
                .await
                .map_err(query_error("columns"))?;

            let mut columns = Vec::with_capacity(rows.len());
            for row in rows {
                let is_nullable: String = row.try_get(2).map_err(query_error("columns"))?;
                let default: Option<String> = row.try_get(3).map_err(query_error("columns"))?;
                columns.push(ColumnDescriptor {
                    name: row.try_get(0).map_err(query_error("columns"))?,
                    data_type: row.try_get(1).map_err(query_error("columns"))?,
                    nullable: is_nullable == "YES",
                    default: default
                        .map(|d| d.trim().to_string())
                        .filter(|d| !d.is_empty()),
                });
            }
            Ok::<_, CatalogError>(columns)
        })
    }

    fn list_constraints(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ConstraintDescriptor>, CatalogError> {
        self.run(async {
            let rows = self
                .client
                .query(LIST_CONSTRAINTS, &[&schema, &table])
                .await
                .map_err(query_error("constraints"))?;

            let mut constraints = Vec::with_capacity(rows.len());
            for row in rows {
                let kind: String = row.try_get(2).map_err(query_error("constraints"))?;
                constraints.push(ConstraintDescriptor {
                    schema: row.try_get(0).map_err(query_error("constraints"))?,
                    name: row.try_get(1).map_err(query_error("constraints"))?,
                    kind: kind.into(),
                    column: row.try_get(3).map_err(query_error("constraints"))?,
                    target_schema: row.try_get(4).map_err(query_error("constraints"))?,
                    target_table: row.try_get(5).map_err(query_error("constraints"))?,
                    target_column: row.try_get(6).map_err(query_error("constraints"))?,
                });
            }
            Ok::<_, CatalogError>(constraints)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unsupported_scheme() {
        let err = PostgresCatalog::connect("mysql://localhost/app")
            .err()
            .expect("mysql URLs are not supported");
        assert!(matches!(err, CatalogError::UnsupportedScheme(ref s) if s == "mysql"));
    }

    #[test]
    fn test_require_sslmode_reaches_connection_attempt() {
        // Nothing listens on port 1; the TLS connector must be built first
        let err = PostgresCatalog::connect(
            "postgres://sqldoc@127.0.0.1:1/app?sslmode=require&connect_timeout=2",
        )
        .err()
        .expect("nothing listens on port 1");
        assert!(matches!(err, CatalogError::Connect(_)), "{err}");
    }
}
