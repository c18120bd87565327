//! PostgreSQL source: mirror the rows of one table into the database index.
//!
//! The table must expose `booktitle`, `bookchunkid` and `bookchunktext`. Each row
//! becomes a document with ID `"{booktitle}_{bookchunkid}"`, name `booktitle` and
//! content `bookchunktext`.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use search_engine::{IndexedDocument, SearchIndex, SourceKind};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info, instrument};

use crate::config::{PgCredentials, PostgresConfig, SyncConfig};
use crate::errors::{ConfigError, Result};
use crate::reconcile::{SyncReport, reconcile};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An open connection whose background driver task is aborted when the
/// session goes out of scope, whatever the exit path.
pub struct PgSession {
    client: Client,
    driver: JoinHandle<()>,
}

impl PgSession {
    pub async fn open(cfg: &PostgresConfig, creds: PgCredentials<'_>) -> Result<Self> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&cfg.host)
            .port(cfg.port)
            .user(creds.user)
            .password(creds.password)
            .dbname(creds.dbname)
            .connect_timeout(CONNECT_TIMEOUT);

        let (client, connection) = pg.connect(NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "postgres connection error");
            }
        });
        debug!(host = %cfg.host, port = cfg.port, "postgres session opened");

        Ok(Self { client, driver })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.driver.abort();
        debug!("postgres session released");
    }
}

/// Rejects anything but `name` or `schema.name` built from identifier characters,
/// since the table name is spliced into the query text.
pub fn validate_table_name(table: &str) -> std::result::Result<(), ConfigError> {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    let re = IDENT.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("static identifier pattern")
    });
    if re.is_match(table) {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var: "PSQL_TABLE_NAME",
            reason: "expected `table` or `schema.table`",
        })
    }
}

pub fn select_statement(table: &str) -> String {
    format!("SELECT booktitle::text, bookchunkid::text, bookchunktext::text FROM {table}")
}

/// Maps one row to its document. NULL columns render as empty strings.
pub fn row_document(
    title: Option<String>,
    chunk_id: Option<String>,
    text: Option<String>,
) -> IndexedDocument {
    let title = title.unwrap_or_default();
    let id = format!("{}_{}", title, chunk_id.unwrap_or_default());
    IndexedDocument::new(id, SourceKind::Database, title, text.unwrap_or_default())
}

/// One database sync pass. No-op when any required parameter is missing.
#[instrument(skip_all, fields(source = "postgres"))]
pub async fn sync_postgres<I: SearchIndex>(index: &I, cfg: &SyncConfig) -> Result<SyncReport> {
    let Some(creds) = cfg.postgres.credentials() else {
        info!(
            "PSQL_TABLE_NAME, PSQL_USER, PSQL_DBNAME, PSQL_PASSWD environment variables are not set, skipped"
        );
        return Ok(SyncReport::skipped(SourceKind::Database));
    };
    validate_table_name(creds.table)?;
    info!(table = creds.table, "start indexing postgres database");

    let docs = {
        let session = PgSession::open(&cfg.postgres, creds).await?;
        let rows = session
            .client()
            .query(select_statement(creds.table).as_str(), &[])
            .await?;
        rows.iter()
            .map(|row| {
                Ok(row_document(
                    row.try_get(0)?,
                    row.try_get(1)?,
                    row.try_get(2)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let report = reconcile(index, SourceKind::Database, &docs, cfg.batch_size).await?;
    info!(
        rows = docs.len(),
        indexed = report.indexed,
        failed = report.failed,
        pruned = report.pruned,
        "postgres sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryIndex;

    fn full_config() -> SyncConfig {
        let mut cfg = SyncConfig::default();
        cfg.postgres.user = Some("reader".into());
        cfg.postgres.password = Some("secret".into());
        cfg.postgres.dbname = Some("library".into());
        cfg.postgres.table = Some("book_chunks".into());
        cfg
    }

    #[test]
    fn row_id_is_title_and_chunk() {
        let doc = row_document(
            Some("Dune".into()),
            Some("12".into()),
            Some("spice".into()),
        );
        assert_eq!(doc.id, "Dune_12");
        assert_eq!(doc.display_name, "Dune");
        assert_eq!(doc.content, "spice");
        assert_eq!(doc.source_kind, SourceKind::Database);
    }

    #[test]
    fn null_columns_become_empty() {
        let doc = row_document(None, Some("3".into()), None);
        assert_eq!(doc.id, "_3");
        assert_eq!(doc.content, "");
    }

    #[test]
    fn table_name_must_be_an_identifier() {
        assert!(validate_table_name("book_chunks").is_ok());
        assert!(validate_table_name("public.book_chunks").is_ok());
        assert!(validate_table_name("books; DROP TABLE x").is_err());
        assert!(validate_table_name("1books").is_err());
        assert!(validate_table_name("").is_err());
    }

    #[test]
    fn statement_projects_the_three_columns() {
        assert_eq!(
            select_statement("books"),
            "SELECT booktitle::text, bookchunkid::text, bookchunktext::text FROM books"
        );
    }

    #[tokio::test]
    async fn missing_any_parameter_is_a_noop() {
        let clear: [fn(&mut SyncConfig); 4] = [
            |c| c.postgres.user = None,
            |c| c.postgres.password = None,
            |c| c.postgres.dbname = None,
            |c| c.postgres.table = None,
        ];
        for unset in clear {
            let mut cfg = full_config();
            unset(&mut cfg);
            let index = MemoryIndex::default();

            let report = sync_postgres(&index, &cfg).await.unwrap();
            assert!(report.skipped);
            assert_eq!(index.bulk_calls(), 0);
        }
    }

    #[tokio::test]
    async fn invalid_table_name_aborts_before_connecting() {
        let mut cfg = full_config();
        cfg.postgres.table = Some("books where 1=1".into());
        let index = MemoryIndex::default();

        let err = sync_postgres(&index, &cfg).await.unwrap_err();
        assert!(matches!(err, crate::errors::SyncError::Config(_)));
    }

    #[tokio::test]
    async fn unreachable_database_fails_without_pruning() {
        let mut cfg = full_config();
        cfg.postgres.host = "127.0.0.1".into();
        cfg.postgres.port = 1;
        let index = MemoryIndex::default();
        index.put(row_document(Some("Dune".into()), Some("1".into()), Some("x".into())));

        let err = sync_postgres(&index, &cfg).await.unwrap_err();
        assert!(matches!(err, crate::errors::SyncError::Postgres(_)));
        assert_eq!(index.ids(SourceKind::Database), vec!["Dune_1"]);
    }
}
