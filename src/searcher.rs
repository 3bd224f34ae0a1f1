use std::path::Path;

use crate::config::{SearchMode, SearchSettings};
use crate::error::BackendError;
use crate::native::NativeIndexBackend;
use crate::remote::RemoteIndexBackend;
use crate::types::ResultSet;

/// 单个搜索提供方：执行一次查询，返回结果集或错误
pub trait SearchBackend {
    fn name(&self) -> &'static str;
    fn execute(&self, query: &str) -> Result<ResultSet, BackendError>;
}

impl<B: SearchBackend + ?Sized> SearchBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn execute(&self, query: &str) -> Result<ResultSet, BackendError> {
        (**self).execute(query)
    }
}

/// 主后端失败时降级到远程后端；远程失败即为最终结果
pub struct FallbackBackend {
    primary: Option<Box<dyn SearchBackend>>,
    remote: Box<dyn SearchBackend>,
}

impl FallbackBackend {
    pub fn new(primary: Box<dyn SearchBackend>, remote: Box<dyn SearchBackend>) -> Self {
        Self {
            primary: Some(primary),
            remote,
        }
    }

    pub fn remote_only(remote: Box<dyn SearchBackend>) -> Self {
        Self {
            primary: None,
            remote,
        }
    }

    /// 按配置构造；native 模式下 DLL 不可用时强制进入仅远程模式
    pub fn from_settings(settings: &SearchSettings, base_dir: &Path) -> Self {
        let remote = Box::new(RemoteIndexBackend::new(settings.api_endpoint.clone()));
        match settings.mode {
            SearchMode::Native => {
                let native = NativeIndexBackend::load(&settings.library_path(base_dir));
                if native.is_loaded() {
                    Self::new(Box::new(native), remote)
                } else {
                    tracing::info!("DLL 不可用，降级为 API 模式");
                    Self::remote_only(remote)
                }
            }
            SearchMode::Remote => Self::remote_only(remote),
        }
    }

    pub fn primary_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map(|p| p.name())
            .unwrap_or_else(|| self.remote.name())
    }
}

impl SearchBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn execute(&self, query: &str) -> Result<ResultSet, BackendError> {
        if let Some(primary) = &self.primary {
            match primary.execute(query) {
                Ok(set) => return Ok(set),
                Err(e) => {
                    tracing::error!("{} 搜索失败: {}，降级到 API", primary.name(), e);
                }
            }
        }
        self.remote.execute(query).map_err(|e| {
            tracing::error!("{} 搜索失败: {}", self.remote.name(), e);
            e
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::types::SearchResult;

    /// 记录调用次数的假后端
    #[derive(Clone)]
    pub struct FakeBackend {
        pub label: &'static str,
        pub calls: Rc<RefCell<Vec<String>>>,
        pub outcome: Rc<RefCell<Result<usize, fn() -> BackendError>>>,
        pub total: Option<usize>,
    }

    impl FakeBackend {
        /// 每次返回 `n` 条结果
        pub fn returning(label: &'static str, n: usize) -> Self {
            Self {
                label,
                calls: Rc::default(),
                outcome: Rc::new(RefCell::new(Ok(n))),
                total: None,
            }
        }

        pub fn failing(label: &'static str, err: fn() -> BackendError) -> Self {
            Self {
                label,
                calls: Rc::default(),
                outcome: Rc::new(RefCell::new(Err(err))),
                total: None,
            }
        }

        pub fn with_total(mut self, total: usize) -> Self {
            self.total = Some(total);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        pub fn set_outcome(&self, outcome: Result<usize, fn() -> BackendError>) {
            *self.outcome.borrow_mut() = outcome;
        }
    }

    pub fn sample_entries(query: &str, n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| SearchResult {
                filename: format!("{query}-{i}.txt"),
                path: format!("/data/{query}/{query}-{i}.txt"),
                size: i as u64,
                modified_time: Some("2024-03-05T12:30:00Z".to_string()),
            })
            .collect()
    }

    impl SearchBackend for FakeBackend {
        fn name(&self) -> &'static str {
            self.label
        }

        fn execute(&self, query: &str) -> Result<ResultSet, BackendError> {
            self.calls.borrow_mut().push(query.to_string());
            match *self.outcome.borrow() {
                Ok(n) => Ok(ResultSet::new(
                    self.total.unwrap_or(n),
                    sample_entries(query, n),
                )),
                Err(make) => Err(make()),
            }
        }
    }
}
