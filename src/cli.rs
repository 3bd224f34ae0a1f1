use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use everything_fs::config::{self, SCHEME};
use everything_fs::host::{path_from_file_url, AfterNavigate, HostPane};
use everything_fs::{
    MetadataResolver, OpenNavigationHandler, PathCodec, SearchCommand, SearchSettings,
    VirtualDirectory,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Everything 搜索虚拟目录 (命令行宿主)", long_about = None)]
pub struct CliArgs {
    /// 配置目录（包含 settings.toml / settings.json）
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// 调试日志输出到 stderr（默认写入临时目录的日志文件）
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出查询结果及各列
    Search {
        #[arg(short = 'q', long = "query")]
        query: String,
    },
    /// 打开某条结果（文件直接打开，目录进入）
    Open {
        #[arg(short = 'q', long = "query")]
        query: String,
        #[arg(short = 'i', long = "index")]
        index: usize,
        /// 在父目录中定位而不是直接打开
        #[arg(long = "reveal")]
        reveal: bool,
    },
    /// 解析虚拟路径
    Resolve { path: String },
    /// 从标准输入读取搜索词
    Prompt,
}

/// 控制台宿主：导航只记录当前路径，open 命令交给系统默认程序
#[derive(Default)]
struct ConsolePane {
    current: Option<String>,
    cursor: Option<String>,
}

impl HostPane for ConsolePane {
    fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
        eprint!("{message}: ");
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let term = line.trim_end_matches(&['\r', '\n'][..]);
                Some(if term.is_empty() { default } else { term }.to_string())
            }
        }
    }

    fn set_path(&mut self, url: &str, after: Option<AfterNavigate>) {
        tracing::info!("宿主导航: {}", url);
        self.current = Some(url.to_string());
        if let Some(cb) = after {
            cb(self);
        }
    }

    fn place_cursor_at(&mut self, url: &str) {
        tracing::info!("宿主光标: {}", url);
        self.cursor = Some(url.to_string());
    }

    fn run_command(&mut self, name: &str, args: serde_json::Value) {
        if name != everything_fs::navigation::OPEN_COMMAND {
            tracing::warn!("未知命令: {}", name);
            return;
        }
        let Some(path) = args
            .get("url")
            .and_then(|u| u.as_str())
            .and_then(path_from_file_url)
        else {
            return;
        };
        if let Err(e) = open::that(&path) {
            tracing::error!("打开文件失败 {}: {}", path.display(), e);
        }
    }

    fn show_alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn rows(vfs: &mut VirtualDirectory, query: &str) -> serde_json::Value {
    let root = PathCodec::encode_query(query);
    let segments: Vec<String> = vfs.listing(&root).iter().map(|e| e.segment()).collect();
    let total = vfs
        .session()
        .cache()
        .get(query)
        .map(|set| set.total_count)
        .unwrap_or(0);

    let children: Vec<serde_json::Value> = segments
        .iter()
        .map(|seg| {
            let child = format!("{root}/{seg}");
            let columns = MetadataResolver::row(vfs, &child);
            json!({
                "url": format!("{SCHEME}{child}"),
                "location": vfs.resolve(&child).url(),
                "columns": columns,
            })
        })
        .collect();

    json!({
        "query": query,
        "total": total,
        "children": children,
    })
}

/// 独立进程里没有浏览历史，序号路径先列出所属查询再解析
fn resolution(vfs: &mut VirtualDirectory, path: &str) -> serde_json::Value {
    let location = vfs.resolve_listed(path);
    json!({
        "path": path,
        "address": format!("{:?}", PathCodec::decode(path)),
        "location": location.url(),
        "is_dir": vfs.is_directory(path),
    })
}

pub fn run_cli(args: CliArgs) -> anyhow::Result<()> {
    let dir = args.config.clone().unwrap_or_else(config::settings_dir);
    let settings = SearchSettings::load(&dir);
    let mut vfs = VirtualDirectory::from_settings(&settings, &dir);
    let mut pane = ConsolePane::default();

    let output = match args.command {
        Command::Search { query } => rows(&mut vfs, &query),
        Command::Prompt => {
            if !SearchCommand::run(&mut pane) {
                anyhow::bail!("搜索已取消或搜索词少于 3 个字符");
            }
            let url = pane.current.clone().unwrap_or_default();
            let (_, path) = everything_fs::host::split_scheme(&url);
            let query = vfs
                .decode(path)
                .query()
                .map(str::to_string)
                .unwrap_or_default();
            rows(&mut vfs, &query)
        }
        Command::Resolve { path } => resolution(&mut vfs, &path),
        Command::Open {
            query,
            index,
            reveal,
        } => {
            vfs.listing(&PathCodec::encode_query(&query));
            if vfs.entry_at(index).is_none() {
                anyhow::bail!("'{}' 没有第 {} 条结果", query, index);
            }
            let url = format!("{SCHEME}{}", PathCodec::encode_child(&query, index));
            let mut handler = OpenNavigationHandler::new();
            let handled = if reveal {
                handler.on_command(
                    &mut vfs,
                    &mut pane,
                    everything_fs::navigation::OPEN_FILE_COMMAND,
                    &json!({ "url": url }),
                )
            } else {
                handler.on_activated(&mut vfs, &mut pane, &url)
            };
            json!({
                "url": url,
                "handled": handled,
                "navigated_to": pane.current,
                "cursor": pane.cursor,
                "selection": handler.selection().map(|s| json!({
                    "query": s.query,
                    "path": s.path,
                    "index": s.index,
                })),
            })
        }
    };

    // 输出JSON
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
