//! 搜索后端场景测试：用当前配置依次执行一组查询，检查返回路径是否真实存在

use std::path::Path;

use everything_fs::config::{self, MAX_RESULTS};
use everything_fs::native::NativeIndexBackend;
use everything_fs::{
    FallbackBackend, RemoteIndexBackend, SearchBackend, SearchMode, SearchSettings,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .init();

    println!("=== 搜索后端场景测试 ===");

    let dir = std::env::args()
        .nth(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::settings_dir);
    let settings = SearchSettings::load(&dir);
    println!("配置目录: {}", dir.display());
    println!("配置: {:?}", settings);

    // 分别探测两个后端，再测组合后的降级后端
    if settings.mode == SearchMode::Native {
        let native = NativeIndexBackend::load(&settings.library_path(&dir));
        println!(
            "DLL 后端: {} ({})",
            if native.is_loaded() { "已加载" } else { "不可用" },
            native.library().display()
        );
        if native.is_loaded() {
            test_scenario(&native, "DLL: 通用关键词", "dll");
        }
    }
    let remote = RemoteIndexBackend::new(settings.api_endpoint.clone());
    println!("API 后端: {}", remote.endpoint());
    test_scenario(&remote, "API: 通用关键词", "dll");

    let backend = FallbackBackend::from_settings(&settings, &dir);
    println!("组合后端主路径: {}", backend.primary_name());

    test_scenario(&backend, "带空格与后缀", "New Folder");
    test_scenario(&backend, "扩展名过滤", "ext:exe;lnk;msi");
    test_scenario(&backend, "仅目录", "folder: windows");
    test_scenario(&backend, "特殊字符", "C:\\Windows\\System32\\calc.exe");
    test_scenario(&backend, "纯数字查询", "2024");

    println!("\n=== 所有场景测试完成 ===");
}

fn test_scenario(backend: &dyn SearchBackend, name: &str, query: &str) {
    println!("\n[场景测试] {}", name);
    println!("查询语句: '{}'", query);

    let set = match backend.execute(query) {
        Ok(set) => set,
        Err(e) => {
            println!("  >>> [结论] 场景测试失败: {}", e);
            return;
        }
    };
    println!("获取结果: {} 条 (匹配总数 {})", set.len(), set.total_count);

    let mut fail_count = 0;
    for (i, res) in set.entries.iter().take(10).enumerate() {
        // 解析出的路径是否真实存在（检查截断/编码问题）
        let exists = Path::new(&res.path).exists();
        if !exists {
            fail_count += 1;
        }
        println!("  {}. {}", i + 1, res.filename);
        println!("     路径: {}", res.path);
        println!(
            "     状态: {}",
            if exists { "正常" } else { "路径损坏/不存在" }
        );
    }

    if set.len() > MAX_RESULTS {
        println!("  ⚠️ 警告: 后端返回 {} 条，超过缓存上限 {}", set.len(), MAX_RESULTS);
    }

    if fail_count > 0 {
        println!("  >>> [结论] 场景测试失败: 存在 {} 个损坏路径", fail_count);
    } else if set.is_empty() {
        println!("  >>> [结论] 场景测试跳过: 未找到匹配项");
    } else {
        println!("  >>> [结论] 场景测试通过");
    }
}
