// apps/cli/src/command/index.rs
//! 全量重建命令

use super::{Command, open_indexer};
use crate::config::Config;
use crate::error::Result;
use crate::library::Library;
use config::AppDirs;
use fulltext::{CancelFlag, IndexError, RebuildReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

pub struct IndexCommand {
    config: Config,
    dirs: AppDirs,
    library: PathBuf,
}

impl IndexCommand {
    pub fn new(config: Config, dirs: AppDirs, library: PathBuf) -> Self {
        Self {
            config,
            dirs,
            library,
        }
    }

    fn print_report(report: &RebuildReport) {
        println!(
            "✅ 已索引 {} 个条目, {} 个文档",
            report.entries, report.documents
        );
        for skipped in &report.skipped {
            println!("  ⏭️  {} ({}): {}", skipped.link, skipped.entry_id, skipped.reason);
        }
        for failed in &report.failed {
            println!("  ❌ {} ({}): {}", failed.link, failed.entry_id, failed.error);
        }
    }
}

#[async_trait::async_trait]
impl Command for IndexCommand {
    async fn execute(&self) -> Result<()> {
        let library = Library::load(&self.library)?;
        let indexer = Arc::new(open_indexer(&self.config, &self.dirs, &library)?);
        println!("📂 索引目录: {:?}", indexer.path());

        let pb = ProgressBar::new(library.entries().len() as u64);
        pb.set_style(ProgressStyle::with_template(
            "{spinner} 索引中 [{elapsed}] | 条目 {pos}/{len} ({percent}%)",
        )?);

        // Ctrl-C 只设置取消标志，重建在下一个条目前停止并回滚
        let cancel = CancelFlag::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let entries = library.entries().to_vec();
        let task = {
            let indexer = indexer.clone();
            let pb = pb.clone();
            tokio::task::spawn_blocking(move || {
                indexer.rebuild_index_with(&entries, &cancel, |done, _| {
                    pb.set_position(done as u64)
                })
            })
        };
        let result = task.await?;
        watcher.abort();

        match result {
            Ok(report) => {
                pb.finish_and_clear();
                Self::print_report(&report);
                Ok(())
            }
            Err(IndexError::Cancelled) => {
                pb.abandon();
                println!("⏹️  已取消，索引保持上一次提交的内容 ({} 个文档)", indexer.num_docs());
                Ok(())
            }
            Err(e) => {
                pb.abandon();
                Err(e.into())
            }
        }
    }
}
