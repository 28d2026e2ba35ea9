//! Tarn: a fixed-arena pool allocator and the data structures that live in it.
//!
//! This is the facade crate re-exporting the public API of the Tarn
//! sub-crates. For most users, adding `tarn` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tarn::prelude::*;
//! use std::sync::Arc;
//!
//! // A 4 KiB arena, first-fit. Construction is fallible, not fatal.
//! let pool = Arc::new(Pool::new(PoolConfig::new(4096))?);
//!
//! // Raw blocks: allocate, access, resize, release.
//! let block = pool.alloc(100).expect("fresh pool has space");
//! pool.write(block, 0, &[42u8; 100])?;
//! let block = pool.resize(Some(block), 200).expect("grow fits");
//! let mut prefix = [0u8; 100];
//! pool.read(block, 0, &mut prefix)?;
//! assert_eq!(prefix, [42u8; 100]);
//! pool.free(block);
//!
//! // A linked list whose nodes live inside the same arena.
//! let mut list = NodeList::new(Arc::clone(&pool));
//! list.push_back(1);
//! list.push_back(2);
//! assert_eq!(list.to_string(), "[1, 2]");
//!
//! drop(list);
//! assert_eq!(pool.stats().used_bytes, 0);
//! # Ok::<(), tarn::PoolError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`pool`] | `tarn-pool` | The arena allocator: `Pool`, handles, config, stats |
//! | [`list`] | `tarn-list` | `NodeList`, a pool-backed singly linked list |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// The arena allocator (re-export of `tarn-pool`).
pub mod pool {
    pub use tarn_pool::*;
}

/// Pool-backed data structures (re-export of `tarn-list`).
pub mod list {
    pub use tarn_list::*;
}

pub use tarn_list::NodeList;
pub use tarn_pool::{BlockHandle, BlockSpan, FitPolicy, Pool, PoolConfig, PoolError, PoolStats};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use tarn_list::{NodeList, NodeRef};
    pub use tarn_pool::{BlockHandle, FitPolicy, Pool, PoolConfig, PoolError, PoolStats};
}
