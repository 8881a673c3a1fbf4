//! Catalog operations built on the codec, store, fetch and storage crates.
//!
//! - [`resolve`]: identifier → book.
//! - [`scan`]: image → identifier → book.
//! - [`render`]: book → cached code image.
//! - [`import`]: remote record → book with deduplicated authors and
//!   categories.

pub mod import;
pub mod render;
pub mod resolve;
pub mod scan;

pub use crate::import::{FailedLink, Import, import_by_external_id, import_record};
pub use crate::render::{Rendered, render_code};
pub use crate::resolve::{Resolution, resolve};
pub use crate::scan::{Scanned, scan_code};
