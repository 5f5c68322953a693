use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use tokio_postgres::types::Json;
use tokio_postgres::{NoTls, Row};
use tracing::info;

use super::{ResponseStore, StoreError};
use crate::survey::answers::AnswerSet;
use crate::survey::domain::{SurveyRecord, SurveyToken, Variant};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS survey_responses (
    token TEXT PRIMARY KEY,
    variant SMALLINT NOT NULL CHECK (variant IN (0, 1)),
    submitted_at_millis BIGINT NOT NULL,
    language TEXT,
    answers JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS survey_responses_variant_idx ON survey_responses (variant);
"#;

/// Postgres-backed store; answers are kept as a JSONB document per token.
///
/// The pool opens connections on first use and replaces broken ones when they
/// are checked out, so callers never manage reconnection themselves.
#[derive(Debug)]
pub struct PostgresResponseStore {
    pool: Pool,
}

impl PostgresResponseStore {
    /// Build the pool without touching the network.
    pub fn connect_lazy(url: &str) -> Result<Self, StoreError> {
        let mut cfg = Config::new();
        cfg.url = Some(url.to_string());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|err| StoreError::Unavailable(format!("pool creation failed: {err}")))?;

        Ok(Self { pool })
    }

    /// Create the responses table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let client = self.client().await?;
        client.batch_execute(SCHEMA).await.map_err(query_error)?;
        info!("survey_responses schema ready");
        Ok(())
    }

    /// Stop handing out connections and drop idle ones.
    pub fn close(&self) {
        self.pool.close();
    }

    async fn client(&self) -> Result<Object, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl ResponseStore for PostgresResponseStore {
    async fn count_by_variant(&self, variant: Variant) -> Result<u64, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM survey_responses WHERE variant = $1",
                &[&variant_column(variant)],
            )
            .await
            .map_err(query_error)?;
        let count: i64 = row.try_get(0).map_err(corrupt)?;
        u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("negative count {count}")))
    }

    async fn find_by_token(
        &self,
        token: &SurveyToken,
    ) -> Result<Option<SurveyRecord>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                r#"
                SELECT token, variant, submitted_at_millis, language, answers
                FROM survey_responses
                WHERE token = $1
                "#,
                &[&token.as_str()],
            )
            .await
            .map_err(query_error)?;

        row.map(record_from_row).transpose()
    }

    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, StoreError> {
        let client = self.client().await?;
        let variant = variant_column(record.variant);
        let answers = Json(&record.answers);

        let inserted = client
            .execute(
                r#"
                INSERT INTO survey_responses (token, variant, submitted_at_millis, language, answers)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (token) DO NOTHING
                "#,
                &[
                    &record.token.as_str(),
                    &variant,
                    &record.submitted_at_millis,
                    &record.language,
                    &answers,
                ],
            )
            .await
            .map_err(query_error)?;

        if inserted == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(record)
    }
}

fn variant_column(variant: Variant) -> i16 {
    i16::from(variant.index())
}

fn record_from_row(row: Row) -> Result<SurveyRecord, StoreError> {
    let variant: i16 = row.try_get("variant").map_err(corrupt)?;
    let variant =
        Variant::try_from(i64::from(variant)).map_err(|err| StoreError::Corrupt(err.to_string()))?;
    let Json(answers): Json<AnswerSet> = row.try_get("answers").map_err(corrupt)?;

    Ok(SurveyRecord {
        token: SurveyToken(row.try_get("token").map_err(corrupt)?),
        variant,
        submitted_at_millis: row.try_get("submitted_at_millis").map_err(corrupt)?,
        language: row.try_get("language").map_err(corrupt)?,
        answers,
    })
}

fn query_error(err: tokio_postgres::Error) -> StoreError {
    if err.is_closed() {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Query(err.to_string())
    }
}

fn corrupt(err: tokio_postgres::Error) -> StoreError {
    StoreError::Corrupt(err.to_string())
}
