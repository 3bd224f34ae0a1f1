//! Everything 搜索虚拟目录
//!
//! 把 Everything 的搜索结果映射成一个按需生成的只读目录：
//! `everything:///<查询词>` 列出结果，`everything:///<查询词>/<序号>` 对应单个结果。
//! 后端优先走 Everything DLL，失败时降级到 HTTP API。

pub mod cache;
pub mod codec;
pub mod columns;
pub mod config;
pub mod error;
pub mod host;
pub mod native;
pub mod navigation;
pub mod remote;
pub mod searcher;
pub mod types;
pub mod vfs;

pub use cache::ResultCache;
pub use codec::{PathCodec, VirtualAddress};
pub use columns::{format_modified, format_size, Column, ColumnValues, MetadataResolver};
pub use config::{SearchMode, SearchSettings};
pub use error::{BackendError, ConfigError, NativeErrorKind};
pub use host::{FileSystemProvider, HostPane, Location};
pub use native::NativeIndexBackend;
pub use navigation::{OpenNavigationHandler, SearchCommand, SelectionState};
pub use remote::RemoteIndexBackend;
pub use searcher::{FallbackBackend, SearchBackend};
pub use types::{ResultSet, SearchResult};
pub use vfs::{ListingEntry, SearchSession, VirtualDirectory};
