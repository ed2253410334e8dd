//! Generic resource layer
//!
//! A resource kind is any storage-backed record type that implements
//! [`Resource`]. Pairing it with a [`Store`] gives it the full CRUD HTTP
//! contract through [`resource_router`].

mod extract;
mod handlers;

pub use extract::Loaded;
pub use handlers::*;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A storage-backed record exposed through the generic CRUD routes
pub trait Resource: Serialize + Send + Sync + 'static {
    /// Path segment the kind is mounted under, e.g. `reminders`
    const NAME: &'static str;

    /// Request body accepted by create
    type Create: DeserializeOwned + Send + 'static;

    /// Request body accepted by update. Every field is optional; absent
    /// fields keep their stored values.
    type Update: DeserializeOwned + Send + 'static;

    /// Storage-assigned identifier
    fn id(&self) -> i32;
}

/// Storage operations the generic handlers need for a resource kind
///
/// Every error is reported to the caller as a storage failure.
pub trait Store<R: Resource>: Send + Sync + 'static {
    fn find_all(&self) -> anyhow::Result<Vec<R>>;

    fn find_by_id(&self, id: i32) -> anyhow::Result<Option<R>>;

    fn create(&self, fields: R::Create) -> anyhow::Result<R>;

    /// Applies `changes` on top of `record` and returns the stored result
    fn update(&self, record: R, changes: R::Update) -> anyhow::Result<R>;

    fn destroy(&self, record: R) -> anyhow::Result<()>;
}

/// Response-only links attached to list entries
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// A record paired with its computed links, serialized as the record's own
/// fields plus a `links` object
#[derive(Serialize, Debug)]
pub struct Linked<R> {
    #[serde(flatten)]
    pub record: R,
    pub links: Links,
}

impl<R: Resource> Linked<R> {
    pub fn new(record: R, base_url: &str, path: &str) -> Self {
        let links = Links {
            self_link: self_link(base_url, path, record.id()),
        };
        Self { record, links }
    }
}

/// Canonical URL of a single record: `<base><path>/<id>`
pub fn self_link(base_url: &str, path: &str, id: i32) -> String {
    format!("{}{}/{}", base_url.trim_end_matches('/'), path, id)
}
