use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity. Can be used multiple times (e.g., -v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// 配置文件路径（默认使用平台配置目录下的 litsearch.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rebuild the full-text index of a library (Ctrl-C cancels)
    Index {
        /// 文献库 JSON 文件
        library: PathBuf,
    },
    /// Index one entry, or only one of its linked files
    Add {
        library: PathBuf,
        entry_id: String,
        /// 只索引该条目的这个文件链接
        #[arg(long)]
        file: Option<String>,
    },
    /// Remove one entry, or only one of its linked files, from the index
    Remove {
        library: PathBuf,
        entry_id: String,
        /// 只删除该文件链接的页面
        #[arg(long)]
        file: Option<String>,
    },
    /// Search a library by fields and full text
    Search {
        library: PathBuf,
        query: String,
        #[command(flatten)]
        flags: FlagArgs,
        /// 只使用字段匹配，不查询全文索引
        #[arg(long)]
        no_fulltext: bool,
        /// 以 JSON 输出结果
        #[arg(long)]
        json: bool,
    },
    /// Print the highlighting pattern for a query
    Pattern {
        query: String,
        #[command(flatten)]
        flags: FlagArgs,
        /// 输出 JavaScript 正则方言
        #[arg(long)]
        javascript: bool,
    },
    /// Show where the index of a library lives and what it holds
    Info { library: PathBuf },
    /// Delete the full-text index of a library
    ClearIndex { library: PathBuf },
}

/// 覆盖配置文件中的默认搜索选项
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FlagArgs {
    /// 区分大小写
    #[arg(short = 'c', long)]
    pub case_sensitive: bool,
    /// 将查询词作为正则表达式
    #[arg(short = 'r', long)]
    pub regex: bool,
}
