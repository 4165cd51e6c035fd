//! HTTP remote for Stockroom.
//!
//! Talks to a plain JSON CRUD resource:
//!
//! | method | path          | meaning                                  |
//! |--------|---------------|------------------------------------------|
//! | GET    | `/items`      | full collection                          |
//! | POST   | `/items`      | create, body without id, returns item    |
//! | GET    | `/items/{id}` | existence probe (2xx present, else absent) |
//! | PUT    | `/items/{id}` | overwrite, returns item                  |
//! | DELETE | `/items/{id}` | delete                                   |
//!
//! # Example
//!
//! ```ignore
//! use stockroom_core::{Connectivity, MemoryStore, Reconciler};
//! use stockroom_http::HttpRemote;
//!
//! let remote = HttpRemote::new("http://localhost:3001/api")?;
//! let mut reconciler = Reconciler::new(MemoryStore::new(), remote);
//! reconciler.handle(Connectivity::Online).await?;
//! ```

mod client;
mod error;
mod wire;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpRemote};
pub use error::HttpError;
