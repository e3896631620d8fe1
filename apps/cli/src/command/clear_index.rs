// apps/cli/src/command/clear_index.rs
//! 删除文献库的全文索引

use super::Command;
use crate::config::Config;
use crate::error::Result;
use config::AppDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ClearIndexCommand {
    config: Config,
    dirs: AppDirs,
    library: PathBuf,
}

impl ClearIndexCommand {
    pub fn new(config: Config, dirs: AppDirs, library: PathBuf) -> Self {
        Self {
            config,
            dirs,
            library,
        }
    }

    fn count_dir_size(path: &Path) -> Result<(usize, u64)> {
        let mut file_count = 0;
        let mut total_size = 0u64;

        for entry in fs::read_dir(path)? {
            let metadata = entry?.metadata()?;
            if metadata.is_file() {
                total_size += metadata.len();
                file_count += 1;
            }
        }

        Ok((file_count, total_size))
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.2} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{} bytes", bytes)
        }
    }
}

#[async_trait::async_trait]
impl Command for ClearIndexCommand {
    async fn execute(&self) -> Result<()> {
        // 不需要读取文献库内容，文献库文件已删除时也能清理
        let index_path = self.config.index_path(&self.dirs, &self.library);
        println!("📂 索引目录: {:?}", index_path);

        if !index_path.exists() {
            println!("⏭️  目录不存在");
            return Ok(());
        }

        // Tantivy 的索引目录是扁平的
        let (count, size) = Self::count_dir_size(&index_path)?;
        fs::remove_dir_all(&index_path)?;
        println!("✨ 已删除 {} 个文件, {}", count, Self::format_size(size));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(512, "512 bytes")]
    #[case(2048, "2.00 KB")]
    #[case(5 * 1024 * 1024, "5.00 MB")]
    #[case(3 * 1024 * 1024 * 1024, "3.00 GB")]
    fn test_format_size(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(ClearIndexCommand::format_size(bytes), expected);
    }
}
