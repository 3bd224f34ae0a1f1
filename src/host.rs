//! 宿主文件管理器的接口约定：本库实现 [`FileSystemProvider`]，调用 [`HostPane`]。

use std::fmt;
use std::path::PathBuf;

use crate::config::SCHEME;

const FILE_SCHEME: &str = "file://";

/// 路径解析结果：真实文件，或本文件系统自己的虚拟地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Virtual(String),
}

impl Location {
    pub fn virtual_path(path: &str) -> Self {
        Self::Virtual(format!("{SCHEME}{path}"))
    }

    pub fn url(&self) -> String {
        match self {
            Self::File(p) => file_url(&p.to_string_lossy()),
            Self::Virtual(url) => url.clone(),
        }
    }

    pub fn as_file(&self) -> Option<&PathBuf> {
        match self {
            Self::File(p) => Some(p),
            Self::Virtual(_) => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// 拆分 `scheme://path`，无 scheme 时 scheme 为空串
pub fn split_scheme(url: &str) -> (&str, &str) {
    match url.find("://") {
        Some(pos) => url.split_at(pos + 3),
        None => ("", url),
    }
}

pub fn virtual_url(path: &str) -> String {
    format!("{SCHEME}{path}")
}

/// 真实路径转 file:// URL，Windows 路径统一为正斜杠
pub fn file_url(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    if normalized.starts_with('/') {
        format!("{FILE_SCHEME}{normalized}")
    } else {
        format!("{FILE_SCHEME}/{normalized}")
    }
}

pub fn path_from_file_url(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix(FILE_SCHEME)?;
    // file:///C:/x -> C:/x
    let bytes = rest.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' {
        return Some(PathBuf::from(&rest[1..]));
    }
    Some(PathBuf::from(rest))
}

/// 默认列
pub const DEFAULT_COLUMNS: [&str; 4] = [
    "everything.Name",
    "everything.Path",
    "everything.Size",
    "everything.DateModified",
];

/// 宿主浏览任意文件系统时使用的接口
pub trait FileSystemProvider {
    fn scheme(&self) -> &'static str;
    fn list(&mut self, path: &str) -> Box<dyn Iterator<Item = String>>;
    fn resolve(&mut self, path: &str) -> Location;
    fn is_dir(&mut self, path: &str) -> bool;
    fn default_columns(&self, _path: &str) -> &'static [&'static str] {
        &DEFAULT_COLUMNS
    }
}

/// 导航完成后执行的回调
pub type AfterNavigate = Box<dyn FnOnce(&mut dyn HostPane)>;

/// 宿主面板提供的 UI 操作
pub trait HostPane {
    /// 取消时返回 None
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
    fn set_path(&mut self, url: &str, after: Option<AfterNavigate>);
    fn place_cursor_at(&mut self, url: &str);
    fn run_command(&mut self, name: &str, args: serde_json::Value);
    fn show_alert(&mut self, message: &str);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// 记录所有调用的宿主面板
    #[derive(Default)]
    pub struct RecordingPane {
        pub answer: Option<String>,
        pub events: Vec<String>,
    }

    impl HostPane for RecordingPane {
        fn prompt(&mut self, message: &str, _default: &str) -> Option<String> {
            self.events.push(format!("prompt {message}"));
            self.answer.clone()
        }

        fn set_path(&mut self, url: &str, after: Option<AfterNavigate>) {
            self.events.push(format!("set_path {url}"));
            if let Some(cb) = after {
                cb(self);
            }
        }

        fn place_cursor_at(&mut self, url: &str) {
            self.events.push(format!("cursor {url}"));
        }

        fn run_command(&mut self, name: &str, args: serde_json::Value) {
            self.events.push(format!("command {name} {args}"));
        }

        fn show_alert(&mut self, message: &str) {
            self.events.push(format!("alert {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_split() {
        assert_eq!(split_scheme("everything:///abc/0"), ("everything://", "/abc/0"));
        assert_eq!(split_scheme("plain"), ("", "plain"));
    }

    #[test]
    fn file_urls_for_windows_and_unix_paths() {
        assert_eq!(file_url(r"C:\Users\me\a.txt"), "file:///C:/Users/me/a.txt");
        assert_eq!(file_url("/home/me/a.txt"), "file:///home/me/a.txt");
        assert_eq!(
            path_from_file_url("file:///C:/Users/me"),
            Some(PathBuf::from("C:/Users/me"))
        );
        assert_eq!(
            path_from_file_url("file:///home/me"),
            Some(PathBuf::from("/home/me"))
        );
        assert_eq!(path_from_file_url("everything:///x"), None);
    }

    #[test]
    fn virtual_location_url() {
        let loc = Location::virtual_path("placeholder");
        assert_eq!(loc.url(), "everything://placeholder");
        assert!(loc.as_file().is_none());
    }
}
