use crate::error::{Result, WrapErr};
use config::AppDirs;
use fulltext::FulltextConfig;
use query::{SearchFlag, SearchFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::FlagArgs;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    pub search: SearchDefaults,
    pub fulltext: FulltextConfig,
}

/// 命令行未指定时使用的搜索选项
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SearchDefaults {
    pub case_sensitive: bool,
    pub regular_expression: bool,
    /// 搜索时同时查询全文索引
    pub fulltext: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            regular_expression: false,
            fulltext: true,
        }
    }
}

const EXAMPLE_CONFIG: &str = r#"# litsearch 配置文件
#
# 此文件在首次运行时自动创建

[search]
# 默认区分大小写
case-sensitive = false
# 默认将查询词作为正则表达式
regular-expression = false
# 搜索时同时查询全文索引
fulltext = true

[fulltext]
# IndexWriter 内存预算（字节）
writer-memory = 50000000
# 单次搜索返回的最大文档数
search-limit = 100
# 解析相对文件链接时依次尝试的目录，文献库所在目录总会被追加在最后
file-directories = [
    # "/Users/yourname/Papers",
]
# 可选：自定义索引根目录
# index-root = "/custom/index/path"
"#;

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        Ok(user_config)
    }

    /// `explicit` 指定的文件必须存在；默认位置的文件不存在时写入示例配置
    pub fn load(dirs: &AppDirs, explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("无法读取配置文件 {:?}", path))?;
            return Self::load_str(&content);
        }

        let config_path = dirs.config_file();
        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => Self::load_str(&user_config_str),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::create_example_config(&config_path)?;
                Self::load_str("")
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create_example_config(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_path, EXAMPLE_CONFIG)?;

        eprintln!("📝 已创建配置文件: {:?}", config_path);
        Ok(())
    }

    /// 命令行开关只能打开选项，不能关闭配置中已打开的选项
    pub fn flags(&self, args: FlagArgs) -> SearchFlags {
        let mut flags = SearchFlags::empty();
        if self.search.case_sensitive || args.case_sensitive {
            flags = flags.with(SearchFlag::CaseSensitive);
        }
        if self.search.regular_expression || args.regex {
            flags = flags.with(SearchFlag::RegularExpression);
        }
        flags
    }

    /// 文献库对应的全文索引配置，文件目录末尾追加文献库所在目录
    pub fn fulltext_for(&self, library_dir: &Path) -> FulltextConfig {
        let mut fulltext = self.fulltext.clone();
        fulltext.file_directories.push(library_dir.to_path_buf());
        fulltext
    }

    pub fn index_path(&self, dirs: &AppDirs, library: &Path) -> PathBuf {
        self.fulltext.index_path_for(library, &dirs.index_root())
    }
}
