use std::path::{Path, PathBuf};

use crate::cache::ResultCache;
use crate::codec::{PathCodec, VirtualAddress};
use crate::config::{SearchSettings, MIN_QUERY_LEN, PLACEHOLDER, SCHEME};
use crate::host::{FileSystemProvider, Location};
use crate::searcher::{FallbackBackend, SearchBackend};
use crate::types::{ResultSet, SearchResult};

/// 列表中的一个子条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingEntry {
    Placeholder,
    Child(usize),
}

impl ListingEntry {
    pub fn segment(&self) -> String {
        match self {
            Self::Placeholder => PLACEHOLDER.to_string(),
            Self::Child(i) => PathCodec::child_segment(*i),
        }
    }
}

/// 一个搜索会话：结果缓存 + 当前查询词
pub struct SearchSession {
    cache: ResultCache,
    current_query: String,
}

impl SearchSession {
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self {
            cache: ResultCache::new(backend),
            current_query: String::new(),
        }
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn current_results(&self) -> Option<&ResultSet> {
        if self.current_query.chars().count() < MIN_QUERY_LEN {
            return None;
        }
        self.cache.get(&self.current_query)
    }
}

/// 搜索结果虚拟目录
pub struct VirtualDirectory {
    session: SearchSession,
}

impl VirtualDirectory {
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self {
            session: SearchSession::new(backend),
        }
    }

    pub fn from_settings(settings: &SearchSettings, base_dir: &Path) -> Self {
        Self::new(Box::new(FallbackBackend::from_settings(settings, base_dir)))
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn current_query(&self) -> &str {
        self.session.current_query()
    }

    /// 解码路径；查询根会替换当前查询词
    pub fn decode(&mut self, path: &str) -> VirtualAddress {
        let address = PathCodec::decode(path);
        if let VirtualAddress::QueryRoot(q) = &address {
            if *q != self.session.current_query {
                tracing::debug!("当前查询词: '{}' -> '{}'", self.session.current_query, q);
                self.session.current_query = q.clone();
            }
        }
        address
    }

    pub fn listing(&mut self, path: &str) -> Vec<ListingEntry> {
        tracing::info!("列出目录: '{}'", path);
        let query = match self.decode(path) {
            VirtualAddress::QueryRoot(q) => q,
            other => {
                tracing::debug!("{:?} 不是可列出的目录", other);
                return vec![ListingEntry::Placeholder];
            }
        };

        if query.chars().count() < MIN_QUERY_LEN {
            tracing::info!("查询词过短 ({} 字符)，显示占位条目", query.chars().count());
            return vec![ListingEntry::Placeholder];
        }

        match self.session.cache.get_or_fetch(&query) {
            Ok(set) if !set.is_empty() => (0..set.len()).map(ListingEntry::Child).collect(),
            Ok(_) => vec![ListingEntry::Placeholder],
            Err(e) => {
                tracing::error!("搜索 '{}' 失败: {}", query, e);
                vec![ListingEntry::Placeholder]
            }
        }
    }

    /// 序号对应的真实路径；其他地址返回虚拟位置
    pub fn resolve(&mut self, path: &str) -> Location {
        if let VirtualAddress::IndexedChild(i) = self.decode(path) {
            if let Some(entry) = self.entry_at(i) {
                return Location::File(PathBuf::from(&entry.path));
            }
        }
        Location::virtual_path(path)
    }

    /// 先列出序号所属的查询目录再解析，用于没有先浏览过目录的调用方
    pub fn resolve_listed(&mut self, path: &str) -> Location {
        if let Some(root) = PathCodec::query_root(path) {
            self.listing(root);
        }
        self.resolve(path)
    }

    pub fn is_directory(&mut self, path: &str) -> bool {
        match self.resolve(path) {
            Location::File(p) => p.is_dir(),
            Location::Virtual(_) => false,
        }
    }

    /// 当前查询结果中的第 `index` 条，不存在时返回 None
    pub fn entry_at(&self, index: usize) -> Option<&SearchResult> {
        let entry = self.session.current_results()?.get(index);
        if entry.is_none() {
            tracing::debug!("'{}' 中没有第 {} 条结果", self.session.current_query, index);
        }
        entry
    }
}

impl FileSystemProvider for VirtualDirectory {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn list(&mut self, path: &str) -> Box<dyn Iterator<Item = String>> {
        Box::new(self.listing(path).into_iter().map(|e| e.segment()))
    }

    fn resolve(&mut self, path: &str) -> Location {
        VirtualDirectory::resolve(self, path)
    }

    fn is_dir(&mut self, path: &str) -> bool {
        self.is_directory(path)
    }
}
