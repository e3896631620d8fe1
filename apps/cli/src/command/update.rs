// apps/cli/src/command/update.rs
//! 增量更新命令：添加与删除单个条目或文件

use super::{Command, open_indexer};
use crate::config::Config;
use crate::error::{OptionExt, Result};
use crate::library::Library;
use config::AppDirs;
use std::path::PathBuf;

pub struct AddCommand {
    config: Config,
    dirs: AppDirs,
    library: PathBuf,
    entry_id: String,
    file: Option<String>,
}

impl AddCommand {
    pub fn new(
        config: Config,
        dirs: AppDirs,
        library: PathBuf,
        entry_id: String,
        file: Option<String>,
    ) -> Self {
        Self {
            config,
            dirs,
            library,
            entry_id,
            file,
        }
    }
}

#[async_trait::async_trait]
impl Command for AddCommand {
    async fn execute(&self) -> Result<()> {
        let library = Library::load(&self.library)?;
        let entry = library.find(&self.entry_id)?;
        let indexer = open_indexer(&self.config, &self.dirs, &library)?;

        let report = match &self.file {
            Some(link) => {
                let file = entry
                    .files
                    .iter()
                    .find(|f| &f.link == link)
                    .ok_or_eyre(format!("条目 {} 没有文件链接 {}", entry.id, link))?;
                indexer.add_linked_file(entry, file)?
            }
            None => indexer.add_to_index(entry)?,
        };

        println!("✅ 已写入 {} 个文档", report.documents);
        for skipped in &report.skipped {
            println!("  ⏭️  {}: {}", skipped.link, skipped.reason);
        }
        for failed in &report.failed {
            println!("  ❌ {}: {}", failed.link, failed.error);
        }
        Ok(())
    }
}

pub struct RemoveCommand {
    config: Config,
    dirs: AppDirs,
    library: PathBuf,
    entry_id: String,
    file: Option<String>,
}

impl RemoveCommand {
    pub fn new(
        config: Config,
        dirs: AppDirs,
        library: PathBuf,
        entry_id: String,
        file: Option<String>,
    ) -> Self {
        Self {
            config,
            dirs,
            library,
            entry_id,
            file,
        }
    }
}

#[async_trait::async_trait]
impl Command for RemoveCommand {
    async fn execute(&self) -> Result<()> {
        // 条目可能已经从文献库中删除，这里只需要文献库路径来定位索引
        let library = Library::load(&self.library)?;
        let indexer = open_indexer(&self.config, &self.dirs, &library)?;

        match &self.file {
            Some(link) => indexer.remove_linked_file(&self.entry_id, link)?,
            None => indexer.remove_from_index(&self.entry_id)?,
        }

        println!("🗑️  索引中剩余 {} 个文档", indexer.num_docs());
        Ok(())
    }
}
