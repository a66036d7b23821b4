//! Object storage adapters for the `ObjectStore` port.
//!
//! - [`GcsObjectStore`]: Google Cloud Storage with service-account auth.
//! - [`UnavailableObjectStore`]: records a startup failure and repeats it.
//! - [`MemoryObjectStore`]: keeps objects in process, for tests and local runs.

mod gcs;
mod memory;
mod unavailable;

pub use gcs::{GcsObjectStore, ServiceAccountKey};
pub use memory::MemoryObjectStore;
pub use unavailable::UnavailableObjectStore;
