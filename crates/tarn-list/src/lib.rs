//! A singly linked list whose nodes live inside a [`tarn_pool::Pool`].
//!
//! [`NodeList`] is a client of the pool allocator, not part of it: it
//! consumes only the public `alloc`/`free`/`read`/`write` surface and never
//! sees block descriptors. Each node is a fixed-size record in the arena —
//! a `u16` value plus the encoded handle of the next node — so an entire
//! list, links included, occupies a bounded, pre-reserved memory footprint.
//!
//! Insertion is fallible by design: when the pool is exhausted the insert
//! is skipped and reported by the `bool` return, and the list is left
//! exactly as it was.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod list;
mod node;

pub use list::{NodeList, NodeRef, Values};
pub use node::NODE_BYTES;
