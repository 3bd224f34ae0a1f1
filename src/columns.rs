use chrono::NaiveDateTime;
use serde::Serialize;

use crate::codec::VirtualAddress;
use crate::types::SearchResult;
use crate::vfs::VirtualDirectory;

/// 占位条目显示的提示文字
pub const PLACEHOLDER_LABEL: &str = "Search using 'Everything' from the command palette";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Path,
    Size,
    DateModified,
}

impl Column {
    pub const ALL: [Column; 4] = [Self::Name, Self::Path, Self::Size, Self::DateModified];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Name => "everything.Name",
            Self::Path => "everything.Path",
            Self::Size => "everything.Size",
            Self::DateModified => "everything.DateModified",
        }
    }
}

/// 一行的全部显示字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnValues {
    pub name: String,
    pub path: String,
    pub size: String,
    pub date_modified: String,
}

/// 路径解码一次后的查找结果
enum Lookup<'a> {
    Placeholder,
    Entry(&'a SearchResult),
    Miss,
}

/// 把结果条目投影为列显示文本
pub struct MetadataResolver;

impl MetadataResolver {
    fn lookup<'a>(vfs: &'a mut VirtualDirectory, path: &str) -> Lookup<'a> {
        match vfs.decode(path) {
            VirtualAddress::Placeholder => Lookup::Placeholder,
            VirtualAddress::IndexedChild(i) => match vfs.entry_at(i) {
                Some(entry) => Lookup::Entry(entry),
                None => Lookup::Miss,
            },
            VirtualAddress::QueryRoot(_) => Lookup::Miss,
        }
    }

    pub fn get(vfs: &mut VirtualDirectory, column: Column, path: &str) -> String {
        match column {
            Column::Name => Self::name(vfs, path),
            Column::Path => Self::parent_path(vfs, path),
            Column::Size => Self::size(vfs, path),
            Column::DateModified => Self::modified_time(vfs, path),
        }
    }

    pub fn name(vfs: &mut VirtualDirectory, path: &str) -> String {
        match Self::lookup(vfs, path) {
            Lookup::Placeholder => PLACEHOLDER_LABEL.to_string(),
            Lookup::Entry(entry) => entry.filename.clone(),
            Lookup::Miss => base_name(path).to_string(),
        }
    }

    pub fn parent_path(vfs: &mut VirtualDirectory, path: &str) -> String {
        match Self::lookup(vfs, path) {
            Lookup::Placeholder => String::new(),
            Lookup::Entry(entry) => parent_dir(&entry.path).to_string(),
            Lookup::Miss => parent_dir(path).to_string(),
        }
    }

    pub fn size(vfs: &mut VirtualDirectory, path: &str) -> String {
        match Self::lookup(vfs, path) {
            Lookup::Entry(entry) => format_size(entry.size),
            _ => String::new(),
        }
    }

    pub fn modified_time(vfs: &mut VirtualDirectory, path: &str) -> String {
        match Self::lookup(vfs, path) {
            Lookup::Entry(entry) => entry
                .modified_time
                .as_deref()
                .map(format_modified)
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    pub fn row(vfs: &mut VirtualDirectory, path: &str) -> ColumnValues {
        ColumnValues {
            name: Self::name(vfs, path),
            path: Self::parent_path(vfs, path),
            size: Self::size(vfs, path),
            date_modified: Self::modified_time(vfs, path),
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

/// 去掉时区后缀按本地时间解析，失败时原样返回
pub fn format_modified(raw: &str) -> String {
    let trimmed = if let Some(s) = raw.strip_suffix('Z') {
        s
    } else if let Some((s, _)) = raw.split_once('+') {
        s
    } else if raw.matches('-').count() > 2 {
        raw.rsplit_once('-').map(|(s, _)| s).unwrap_or(raw)
    } else {
        raw
    };

    match NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(e) => {
            tracing::debug!("无法解析修改时间 '{}': {}", raw, e);
            raw.to_string()
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// 路径最后一个非空段
fn base_name(path: &str) -> &str {
    path.rsplit(is_separator).find(|s| !s.is_empty()).unwrap_or("")
}

/// 路径的目录部分，保留盘符根 (`C:\`)
fn parent_dir(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    match trimmed.rfind(is_separator) {
        Some(0) => &trimmed[..1],
        Some(pos) if trimmed[..pos].ends_with(':') => &trimmed[..=pos],
        Some(pos) => &trimmed[..pos],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::testing::FakeBackend;

    #[test]
    fn size_thresholds() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(format_size(1536), "1.5 KB");
    }

    #[test]
    fn modified_time_strips_zone_suffixes() {
        assert_eq!(format_modified("2024-03-05T12:30:00Z"), "2024-03-05 12:30:00");
        assert_eq!(format_modified("2024-03-05T12:30:00+02:00"), "2024-03-05 12:30:00");
        assert_eq!(format_modified("2024-03-05T12:30:00-05:00"), "2024-03-05 12:30:00");
        assert_eq!(format_modified("2024-03-05T12:30:00"), "2024-03-05 12:30:00");
    }

    #[test]
    fn unparseable_time_is_returned_unchanged() {
        assert_eq!(format_modified("yesterday"), "yesterday");
        assert_eq!(
            format_modified("2024-03-05T12:30:00.123456"),
            "2024-03-05T12:30:00.123456"
        );
    }

    #[test]
    fn path_helpers_handle_windows_paths() {
        assert_eq!(parent_dir(r"C:\Users\me\a.txt"), r"C:\Users\me");
        assert_eq!(parent_dir(r"C:\a.txt"), r"C:\");
        assert_eq!(parent_dir("/home/me/a.txt"), "/home/me");
        assert_eq!(parent_dir("/a.txt"), "/");
        assert_eq!(parent_dir("a.txt"), "");
        assert_eq!(base_name("/abc//"), "abc");
        assert_eq!(base_name(r"C:\x\y.txt"), "y.txt");
    }

    #[test]
    fn projections_for_indexed_child() {
        let mut vfs = VirtualDirectory::new(Box::new(FakeBackend::returning("fake", 3)));
        vfs.listing("/abc");

        let row = MetadataResolver::row(&mut vfs, "/abc/2");
        assert_eq!(row.name, "abc-2.txt");
        assert_eq!(row.path, "/data/abc");
        assert_eq!(row.size, "2 B");
        assert_eq!(row.date_modified, "2024-03-05 12:30:00");
    }

    #[test]
    fn projections_for_placeholder_and_misses() {
        let mut vfs = VirtualDirectory::new(Box::new(FakeBackend::returning("fake", 3)));
        vfs.listing("/ab");

        assert_eq!(MetadataResolver::name(&mut vfs, "placeholder"), PLACEHOLDER_LABEL);
        assert_eq!(MetadataResolver::get(&mut vfs, Column::Path, "placeholder"), "");
        assert_eq!(MetadataResolver::size(&mut vfs, "placeholder"), "");

        // 查询过短时序号无法解析，回退到通用的文件名/目录推导
        assert_eq!(MetadataResolver::name(&mut vfs, "/ab/1"), "1");
        assert_eq!(MetadataResolver::parent_path(&mut vfs, "/ab/1"), "/ab");
        assert_eq!(MetadataResolver::size(&mut vfs, "/ab/1"), "");
        assert_eq!(MetadataResolver::modified_time(&mut vfs, "/ab/1"), "");
    }

    #[test]
    fn column_ids_match_defaults() {
        let ids: Vec<&str> = Column::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids, crate::host::DEFAULT_COLUMNS);
    }
}
