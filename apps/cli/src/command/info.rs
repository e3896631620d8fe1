// apps/cli/src/command/info.rs
//! 显示文献库的索引状态

use super::{Command, open_indexer};
use crate::config::Config;
use crate::error::Result;
use crate::library::Library;
use config::AppDirs;
use std::path::PathBuf;

pub struct InfoCommand {
    config: Config,
    dirs: AppDirs,
    library: PathBuf,
}

impl InfoCommand {
    pub fn new(config: Config, dirs: AppDirs, library: PathBuf) -> Self {
        Self {
            config,
            dirs,
            library,
        }
    }
}

#[async_trait::async_trait]
impl Command for InfoCommand {
    async fn execute(&self) -> Result<()> {
        let library = Library::load(&self.library)?;
        let indexer = open_indexer(&self.config, &self.dirs, &library)?;

        println!("📚 文献库: {:?} ({} 个条目)", library.path(), library.entries().len());
        println!("📂 索引目录: {:?}", indexer.path());
        println!("📄 文档数: {}", indexer.num_docs());
        if indexer.needs_rebuild() {
            println!("💡 索引为空或已被重置，运行 'litsearch index {:?}' 重建", library.path());
        }
        Ok(())
    }
}
