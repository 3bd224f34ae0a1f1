use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::config::{MAX_RESULTS, MIN_QUERY_LEN};
use crate::error::BackendError;
use crate::searcher::SearchBackend;
use crate::types::ResultSet;

/// 查询词 -> 结果集。会话期内不淘汰；失败的查询不缓存，下次重新请求
pub struct ResultCache {
    backend: Box<dyn SearchBackend>,
    entries: HashMap<String, ResultSet>,
}

impl ResultCache {
    pub fn new(backend: Box<dyn SearchBackend>) -> Self {
        Self {
            backend,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_fetch(&mut self, query: &str) -> Result<&ResultSet, BackendError> {
        let len = query.chars().count();
        if len < MIN_QUERY_LEN {
            return Err(BackendError::QueryTooShort { len });
        }

        match self.entries.entry(query.to_string()) {
            Entry::Occupied(hit) => {
                tracing::debug!("命中缓存: '{}'", query);
                Ok(hit.into_mut())
            }
            Entry::Vacant(slot) => {
                tracing::info!("执行搜索: '{}'", query);
                let mut set = self.backend.execute(query)?;
                if set.len() > MAX_RESULTS {
                    set.truncate(MAX_RESULTS);
                    tracing::info!("结果截断为 {} 条", MAX_RESULTS);
                }
                tracing::info!("已缓存 '{}': 共 {} 条", query, set.total_count);
                Ok(slot.insert(set))
            }
        }
    }

    /// 只查缓存，不触发搜索
    pub fn get(&self, query: &str) -> Option<&ResultSet> {
        self.entries.get(query)
    }

    pub fn contains(&self, query: &str) -> bool {
        self.entries.contains_key(query)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
