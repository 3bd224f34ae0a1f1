use serde_json::json;

use crate::codec::{PathCodec, VirtualAddress};
use crate::config::{MIN_QUERY_LEN, SCHEME};
use crate::host::{file_url, split_scheme, virtual_url, HostPane};
use crate::vfs::VirtualDirectory;

pub const OPEN_COMMAND: &str = "open";
pub const OPEN_FILE_COMMAND: &str = "open_file";

/// 最近一次从搜索结果中打开的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub query: String,
    pub path: String,
    pub index: usize,
}

/// 命令面板中的 "Everything" 搜索命令
pub struct SearchCommand;

impl SearchCommand {
    pub const PROMPT: &'static str = "Enter search term (minimum 3 characters)";

    /// 返回是否跳转到了搜索目录
    pub fn run(pane: &mut dyn HostPane) -> bool {
        let Some(term) = pane.prompt(Self::PROMPT, "") else {
            tracing::info!("用户取消了搜索");
            return false;
        };
        if term.chars().count() < MIN_QUERY_LEN {
            tracing::warn!("搜索词过短: '{}'", term);
            return false;
        }
        let url = virtual_url(&PathCodec::encode_query(&term));
        tracing::info!("跳转到 {}", url);
        pane.set_path(&url, None);
        true
    }
}

/// 处理结果条目的打开，并在返回搜索目录时恢复光标
#[derive(Default)]
pub struct OpenNavigationHandler {
    selection: Option<SelectionState>,
}

impl OpenNavigationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    fn remember(&mut self, vfs: &VirtualDirectory, path: &str, index: usize) {
        self.selection = Some(SelectionState {
            query: vfs.current_query().to_string(),
            path: path.to_string(),
            index,
        });
    }

    /// 条目被激活 (双击/回车)。返回 true 表示已处理，宿主不应再执行默认行为
    pub fn on_activated(
        &mut self,
        vfs: &mut VirtualDirectory,
        pane: &mut dyn HostPane,
        url: &str,
    ) -> bool {
        let (scheme, path) = split_scheme(url);
        if scheme != SCHEME {
            return false;
        }

        let VirtualAddress::IndexedChild(index) = vfs.decode(path) else {
            return true;
        };
        let Some(entry) = vfs.entry_at(index) else {
            tracing::warn!("激活的条目 {} 不存在", index);
            return true;
        };
        let real = entry.path.clone();

        if std::path::Path::new(&real).is_dir() {
            tracing::info!("进入目录: {}", real);
            pane.set_path(&file_url(&real), None);
        } else {
            // 直接打开文件，不先跳转到父目录
            tracing::info!("直接打开文件: {}", real);
            pane.run_command(OPEN_COMMAND, json!({ "url": file_url(&real) }));
            self.remember(vfs, &real, index);
        }
        true
    }

    /// 拦截 open_file 命令：文件在其父目录中定位，目录直接进入
    pub fn on_command(
        &mut self,
        vfs: &mut VirtualDirectory,
        pane: &mut dyn HostPane,
        name: &str,
        args: &serde_json::Value,
    ) -> bool {
        if name != OPEN_FILE_COMMAND {
            return false;
        }
        let Some(url) = args.get("url").and_then(|v| v.as_str()) else {
            return false;
        };
        let (scheme, path) = split_scheme(url);
        if scheme != SCHEME {
            return false;
        }

        let VirtualAddress::IndexedChild(index) = vfs.decode(path) else {
            // 占位条目等：吞掉命令，什么都不做
            return true;
        };
        let Some(entry) = vfs.entry_at(index) else {
            return false;
        };
        let real = entry.path.clone();

        if std::path::Path::new(&real).is_dir() {
            pane.set_path(&file_url(&real), None);
            return true;
        }

        self.remember(vfs, &real, index);
        let parent = std::path::Path::new(&real)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = file_url(&real);
        tracing::info!("在父目录中定位: {}", parent);
        pane.set_path(
            &file_url(&parent),
            Some(Box::new(move |pane: &mut dyn HostPane| {
                pane.place_cursor_at(&target);
            })),
        );
        true
    }

    /// 宿主路径变化；回到同一查询的结果目录时把光标放回上次打开的条目
    pub fn on_path_changed(&mut self, vfs: &mut VirtualDirectory, pane: &mut dyn HostPane, url: &str) {
        let (scheme, path) = split_scheme(url);
        if scheme != SCHEME {
            return;
        }
        let VirtualAddress::QueryRoot(query) = vfs.decode(path) else {
            return;
        };
        if let Some(sel) = &self.selection {
            if sel.query == query {
                let cursor = virtual_url(&PathCodec::encode_child(&query, sel.index));
                tracing::debug!("恢复光标: {}", cursor);
                pane.place_cursor_at(&cursor);
            }
        }
    }
}
