// apps/cli/src/command/search.rs
//! 搜索命令

use super::{Command, open_indexer};
use crate::cli::FlagArgs;
use crate::config::Config;
use crate::error::{Result, error};
use crate::library::Library;
use config::AppDirs;
use fulltext::{FulltextIndexer, LibraryHit, LibrarySearch, search_library};
use query::SearchQuery;
use std::path::PathBuf;

pub struct SearchCommand {
    config: Config,
    dirs: AppDirs,
    library: PathBuf,
    query: String,
    flags: FlagArgs,
    no_fulltext: bool,
    json: bool,
}

impl SearchCommand {
    pub fn new(
        config: Config,
        dirs: AppDirs,
        library: PathBuf,
        query: String,
        flags: FlagArgs,
        no_fulltext: bool,
        json: bool,
    ) -> Self {
        Self {
            config,
            dirs,
            library,
            query,
            flags,
            no_fulltext,
            json,
        }
    }

    /// 打不开索引时只用字段匹配
    fn indexer(&self, library: &Library) -> Option<FulltextIndexer> {
        if self.no_fulltext || !self.config.search.fulltext {
            return None;
        }
        match open_indexer(&self.config, &self.dirs, library) {
            Ok(indexer) if indexer.needs_rebuild() => {
                tracing::warn!("全文索引为空，请先运行 index 命令");
                Some(indexer)
            }
            Ok(indexer) => Some(indexer),
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        }
    }

    fn print_hit(hit: &LibraryHit) {
        let marker = if hit.matches_fields { "📄" } else { "🔍" };
        println!("{} {}", marker, hit.entry_id);
        for page in &hit.pages {
            println!("    {} 第 {} 页 ({:.2})", page.path, page.page, page.score);
        }
    }

    fn print(&self, query: &SearchQuery, result: &LibrarySearch) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
            return Ok(());
        }

        println!("🔎 {}", query);
        if result.fulltext_unavailable {
            println!("⚠️  全文索引不可用，只显示字段匹配结果");
        }
        for hit in &result.hits {
            Self::print_hit(hit);
        }
        println!("共 {} 个条目", result.hits.len());
        Ok(())
    }
}

#[async_trait::async_trait]
impl Command for SearchCommand {
    async fn execute(&self) -> Result<()> {
        let query = SearchQuery::new(self.query.as_str(), self.config.flags(self.flags));
        if let Some(e) = query.pattern_error() {
            return Err(error!("无效的查询: {}", e));
        }

        let library = Library::load(&self.library)?;
        let indexer = self.indexer(&library);
        let result = search_library(&query, library.entries(), indexer.as_ref());
        self.print(&query, &result)
    }
}
