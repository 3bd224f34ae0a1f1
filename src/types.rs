use serde::Deserialize;

/// 单条搜索结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// 文件名 (不含目录)
    pub filename: String,
    /// 完整真实路径
    pub path: String,
    pub size: u64,
    /// ISO-8601 风格的修改时间，后端未提供时为 None
    pub modified_time: Option<String>,
}

/// 一次查询的结果集
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    /// 后端报告的匹配总数，可能大于 entries 的长度
    pub total_count: usize,
    pub entries: Vec<SearchResult>,
}

impl ResultSet {
    pub fn new(total_count: usize, entries: Vec<SearchResult>) -> Self {
        Self { total_count, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.entries.get(index)
    }

    /// 截断到前 `limit` 条，total_count 保持不变
    pub fn truncate(&mut self, limit: usize) {
        self.entries.truncate(limit);
    }
}

/// 远程 API 的响应体
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteResponse {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub results: Vec<RemoteResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteResult {
    pub filename: String,
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub date_modified: Option<String>,
}

impl From<RemoteResponse> for ResultSet {
    fn from(resp: RemoteResponse) -> Self {
        let entries = resp
            .results
            .into_iter()
            .map(|r| SearchResult {
                filename: r.filename,
                path: r.path,
                size: r.size,
                modified_time: r.date_modified,
            })
            .collect();
        ResultSet::new(resp.count, entries)
    }
}
