use crate::*;
use auth::{Authenticator, Principal, SharedAuthenticator, ADMIN_ROLE};
use axum::body::{to_bytes, Body};
use axum::http::{request::Parts, Request, StatusCode};
use chrono::Utc;
use dto::{CreateCategoryDto, UpdateCategoryDto};
use resource::{resource_router, ResourceState, Store};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Sets up a test database with migrations applied
///
/// Each call gets its own shared in-memory database. Plain ":memory:" gives
/// every pooled connection a separate database, so migrations run on one
/// connection would not be visible on the others.
pub fn setup_test_db() -> Arc<db::DbPool> {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Authenticator that resolves every request to the same principal
pub struct StaticAuthenticator(pub Option<Principal>);

impl Authenticator for StaticAuthenticator {
    fn authenticate(&self, _parts: &Parts) -> anyhow::Result<Option<Principal>> {
        Ok(self.0.clone())
    }
}

pub fn admin() -> SharedAuthenticator {
    Arc::new(StaticAuthenticator(Some(Principal::new(1, "ada".to_string(), [ADMIN_ROLE]))))
}

pub fn viewer() -> SharedAuthenticator {
    Arc::new(StaticAuthenticator(Some(Principal::new(2, "bob".to_string(), ["viewer"]))))
}

pub fn anonymous() -> SharedAuthenticator {
    Arc::new(StaticAuthenticator(None))
}

/// In-memory category store that counts every call made to it
///
/// Setting `fail` makes every operation return an error after counting it.
#[derive(Default)]
pub struct SpyStore {
    records: Mutex<Vec<models::Category>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    pub fail: bool,
}

impl SpyStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn insert(&self, name: &str) -> models::Category {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        let now = Utc::now().naive_utc();
        let record = models::Category {
            id,
            name: name.to_string(),
            description: Some(format!("{name} description")),
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    fn record_call(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("disk I/O error");
        }
        Ok(())
    }
}

impl Store<models::Category> for SpyStore {
    fn find_all(&self) -> anyhow::Result<Vec<models::Category>> {
        self.record_call()?;
        Ok(self.records.lock().unwrap().clone())
    }

    fn find_by_id(&self, id: i32) -> anyhow::Result<Option<models::Category>> {
        self.record_call()?;
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    fn create(&self, fields: CreateCategoryDto) -> anyhow::Result<models::Category> {
        self.record_call()?;
        let mut record = self.insert(&fields.name);
        record.description = fields.description;
        let mut records = self.records.lock().unwrap();
        if let Some(stored) = records.iter_mut().find(|r| r.id == record.id) {
            *stored = record.clone();
        }
        Ok(record)
    }

    fn update(
        &self,
        mut record: models::Category,
        changes: UpdateCategoryDto,
    ) -> anyhow::Result<models::Category> {
        self.record_call()?;
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(description) = changes.description {
            record.description = description;
        }
        record.updated_at = Utc::now().naive_utc();
        let mut records = self.records.lock().unwrap();
        if let Some(stored) = records.iter_mut().find(|r| r.id == record.id) {
            *stored = record.clone();
        }
        Ok(record)
    }

    fn destroy(&self, record: models::Category) -> anyhow::Result<()> {
        self.record_call()?;
        self.records.lock().unwrap().retain(|r| r.id != record.id);
        Ok(())
    }
}

/// Builds a category router over `store` with the given caller
pub fn spy_app(store: Arc<SpyStore>, authenticator: SharedAuthenticator) -> axum::Router {
    let state = ResourceState::new(store, authenticator, Some("http://test.local".to_string()));
    axum::Router::new().nest(
        "/categories",
        resource_router::<models::Category, SpyStore>(state),
    )
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for empty bodies)
pub async fn send(app: axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().uri(uri).method(method);
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[test]
fn test_setup_test_db_creates_tables() {
    use diesel::sql_types::Text;
    use diesel::{QueryableByName, RunQueryDsl};

    #[derive(QueryableByName, Debug)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> =
        diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
            .load(&mut conn)
            .expect("Failed to load table names");

    let expected_tables = [
        "categories", "reminders", "sessions", "tests", "timeframes", "users",
        "__diesel_schema_migrations",
    ];
    for table in expected_tables {
        assert!(
            table_names.iter().any(|t| t.name == table),
            "Table '{}' not found in database",
            table
        );
    }
}
