use std::path::{Path, PathBuf};

use crate::config::MAX_RESULTS;
use crate::error::{BackendError, NativeErrorKind};
use crate::searcher::SearchBackend;
use crate::types::{ResultSet, SearchResult};

/// Everything SDK 请求字段标志
pub mod request {
    pub const FULL_PATH_AND_FILE_NAME: u32 = 0x0000_0004;
    pub const SIZE: u32 = 0x0000_0010;
    pub const DATE_MODIFIED: u32 = 0x0000_0040;
}

/// 路径 + 大小 + 修改时间，最低要求的字段集合
pub const REQUIRED_FIELDS: u32 =
    request::FULL_PATH_AND_FILE_NAME | request::SIZE | request::DATE_MODIFIED;

/// 1601-01-01 到 1970-01-01 之间的 100ns 刻度数
const FILETIME_UNIX_OFFSET: u64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Everything DLL 的调用约定，按序号固定
pub trait EverythingApi {
    fn set_search(&self, text: &str);
    fn set_request_flags(&self, flags: u32);
    fn query(&self, wait: bool) -> bool;
    fn last_error(&self) -> u32;
    fn num_results(&self) -> u32;
    fn result_full_path(&self, index: u32) -> Option<String>;
    fn result_size(&self, index: u32) -> Option<u64>;
    /// FILETIME 刻度 (100ns，自 1601-01-01 UTC)
    fn result_date_modified(&self, index: u32) -> Option<u64>;
}

/// FILETIME 刻度转 Unix 秒；早于 1970 的值视为无效
pub fn filetime_to_unix(ticks: u64) -> Option<i64> {
    let since_epoch = ticks.checked_sub(FILETIME_UNIX_OFFSET)?;
    i64::try_from(since_epoch / TICKS_PER_SECOND).ok()
}

fn format_filetime(ticks: u64) -> Option<String> {
    if ticks == 0 {
        return None;
    }
    let secs = filetime_to_unix(ticks)?;
    let utc = chrono::DateTime::from_timestamp(secs, 0)?;
    Some(
        utc.with_timezone(&chrono::Local)
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string(),
    )
}

/// 取路径的最后一段，兼容 Windows 分隔符
fn base_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '\\' || c == '/').find(|s| !s.is_empty()).unwrap_or(path)
}

pub struct NativeIndexBackend {
    library: PathBuf,
    api: Result<Box<dyn EverythingApi>, String>,
}

impl NativeIndexBackend {
    /// 加载 DLL；失败时后端仍然构造成功，但每次执行都返回 NativeUnavailable
    pub fn load(library: &Path) -> Self {
        let api = if !library.exists() {
            Err(format!("DLL file not found at {}", library.display()))
        } else {
            ffi::load(library)
        };
        match &api {
            Ok(_) => tracing::info!("Everything DLL 已加载: {}", library.display()),
            Err(e) => tracing::error!("Everything DLL 加载失败: {}", e),
        }
        Self {
            library: library.to_path_buf(),
            api,
        }
    }

    pub fn with_api(api: Box<dyn EverythingApi>) -> Self {
        Self {
            library: PathBuf::new(),
            api: Ok(api),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.api.is_ok()
    }

    pub fn library(&self) -> &Path {
        &self.library
    }
}

impl SearchBackend for NativeIndexBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    fn execute(&self, query: &str) -> Result<ResultSet, BackendError> {
        let api = self
            .api
            .as_ref()
            .map_err(|e| BackendError::NativeUnavailable(e.clone()))?;

        tracing::info!("DLL 搜索: '{}'", query);
        api.set_search(query);
        api.set_request_flags(REQUIRED_FIELDS);

        if !api.query(true) {
            let kind = NativeErrorKind::from_code(api.last_error());
            tracing::error!("Everything DLL 搜索失败: {}", kind.message());
            return Err(BackendError::Native(kind));
        }

        let count = api.num_results();
        let take = (count as usize).min(MAX_RESULTS) as u32;
        let mut entries = Vec::with_capacity(take as usize);
        for i in 0..take {
            // 读不到路径的条目直接跳过
            let Some(path) = api.result_full_path(i).filter(|p| !p.is_empty()) else {
                tracing::debug!("结果 {} 无法读取路径，跳过", i);
                continue;
            };
            entries.push(SearchResult {
                filename: base_name(&path).to_string(),
                size: api.result_size(i).unwrap_or(0),
                modified_time: api.result_date_modified(i).and_then(format_filetime),
                path,
            });
        }

        tracing::info!("DLL 返回 {} 条，处理 {} 条", count, entries.len());
        Ok(ResultSet::new(count as usize, entries))
    }
}

#[cfg(windows)]
mod ffi {
    use std::path::Path;

    use windows::core::{s, HSTRING, PCSTR};
    use windows::Win32::Foundation::{FreeLibrary, HMODULE};
    use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};

    use super::EverythingApi;

    type SetSearchW = unsafe extern "system" fn(*const u16);
    type SetRequestFlags = unsafe extern "system" fn(u32);
    type QueryW = unsafe extern "system" fn(i32) -> i32;
    type GetLastError = unsafe extern "system" fn() -> u32;
    type GetNumResults = unsafe extern "system" fn() -> u32;
    type GetResultFullPathNameW = unsafe extern "system" fn(u32, *mut u16, u32) -> u32;
    type GetResultSize = unsafe extern "system" fn(u32, *mut i64) -> i32;
    type GetResultDateModified = unsafe extern "system" fn(u32, *mut u64) -> i32;

    /// MAX_PATH 的长路径上限
    const PATH_BUFFER_LEN: usize = 32767;

    pub struct EverythingDll {
        module: HMODULE,
        set_search: SetSearchW,
        set_request_flags: SetRequestFlags,
        query: QueryW,
        get_last_error: GetLastError,
        get_num_results: GetNumResults,
        get_full_path: GetResultFullPathNameW,
        get_size: GetResultSize,
        get_date_modified: GetResultDateModified,
    }

    unsafe fn symbol<T>(module: HMODULE, name: PCSTR) -> Result<T, String> {
        match GetProcAddress(module, name) {
            // 所有导出函数都是指针大小，签名由上面的类型别名约定
            Some(f) => Ok(std::mem::transmute_copy(&f)),
            None => Err(format!("missing export {}", name.to_string().unwrap_or_default())),
        }
    }

    pub fn load(path: &Path) -> Result<Box<dyn EverythingApi>, String> {
        let module = unsafe { LoadLibraryW(&HSTRING::from(path.as_os_str())) }
            .map_err(|e| format!("LoadLibraryW failed: {e}"))?;

        let dll = unsafe {
            let resolve = || -> Result<EverythingDll, String> {
                Ok(EverythingDll {
                    module,
                    set_search: symbol(module, s!("Everything_SetSearchW"))?,
                    set_request_flags: symbol(module, s!("Everything_SetRequestFlags"))?,
                    query: symbol(module, s!("Everything_QueryW"))?,
                    get_last_error: symbol(module, s!("Everything_GetLastError"))?,
                    get_num_results: symbol(module, s!("Everything_GetNumResults"))?,
                    get_full_path: symbol(module, s!("Everything_GetResultFullPathNameW"))?,
                    get_size: symbol(module, s!("Everything_GetResultSize"))?,
                    get_date_modified: symbol(module, s!("Everything_GetResultDateModified"))?,
                })
            };
            resolve()
        };

        match dll {
            Ok(dll) => Ok(Box::new(dll)),
            Err(e) => {
                unsafe {
                    let _ = FreeLibrary(module);
                }
                Err(e)
            }
        }
    }

    impl EverythingApi for EverythingDll {
        fn set_search(&self, text: &str) {
            let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
            unsafe { (self.set_search)(wide.as_ptr()) }
        }

        fn set_request_flags(&self, flags: u32) {
            unsafe { (self.set_request_flags)(flags) }
        }

        fn query(&self, wait: bool) -> bool {
            unsafe { (self.query)(wait as i32) != 0 }
        }

        fn last_error(&self) -> u32 {
            unsafe { (self.get_last_error)() }
        }

        fn num_results(&self) -> u32 {
            unsafe { (self.get_num_results)() }
        }

        fn result_full_path(&self, index: u32) -> Option<String> {
            let mut buf = vec![0u16; PATH_BUFFER_LEN];
            let written =
                unsafe { (self.get_full_path)(index, buf.as_mut_ptr(), PATH_BUFFER_LEN as u32) };
            if written == 0 {
                return None;
            }
            let len = (written as usize).min(PATH_BUFFER_LEN);
            Some(String::from_utf16_lossy(&buf[..len]))
        }

        fn result_size(&self, index: u32) -> Option<u64> {
            let mut size: i64 = 0;
            let ok = unsafe { (self.get_size)(index, &mut size) };
            (ok != 0).then(|| size.max(0) as u64)
        }

        fn result_date_modified(&self, index: u32) -> Option<u64> {
            let mut ticks: u64 = 0;
            let ok = unsafe { (self.get_date_modified)(index, &mut ticks) };
            (ok != 0).then_some(ticks)
        }
    }

    impl Drop for EverythingDll {
        fn drop(&mut self) {
            unsafe {
                let _ = FreeLibrary(self.module);
            }
        }
    }
}

#[cfg(not(windows))]
mod ffi {
    use std::path::Path;

    use super::EverythingApi;

    pub fn load(path: &Path) -> Result<Box<dyn EverythingApi>, String> {
        Err(format!(
            "native index library {} is only supported on Windows",
            path.display()
        ))
    }
}
