//! Throwaway PostgreSQL schemas for database-backed tests.

use homecheck_inspector::{DbConfig, DEFAULT_DB_URL};
use std::time::Duration;
use tokio_postgres::{Client, NoTls};
use uuid::Uuid;

pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string())
}

async fn admin_client() -> Client {
    let (client, connection) = tokio_postgres::connect(&database_url(), NoTls)
        .await
        .expect("Failed to connect to test database");
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            eprintln!("postgres connection error: {err}");
        }
    });
    client
}

/// A schema created for one test and dropped by [`TestSchema::drop_schema`].
pub struct TestSchema {
    pub name: String,
}

impl TestSchema {
    pub async fn create() -> Self {
        let name = format!("homecheck_test_{}", Uuid::now_v7().simple());
        admin_client()
            .await
            .batch_execute(&format!("CREATE SCHEMA {}", name))
            .await
            .expect("Failed to create test schema");
        Self { name }
    }

    /// Connection settings that resolve unqualified tables in this schema.
    pub fn db_config(&self) -> DbConfig {
        let url = database_url();
        let separator = if url.contains('?') { '&' } else { '?' };
        DbConfig::new(format!(
            "{}{}options=-csearch_path%3D{}%2Cpublic",
            url, separator, self.name
        ))
        .with_connect_timeout(Duration::from_secs(5))
    }

    pub async fn drop_schema(self) {
        admin_client()
            .await
            .batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.name))
            .await
            .expect("Failed to drop test schema");
    }
}
