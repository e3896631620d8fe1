mod clear_index;
mod index;
mod info;
mod pattern;
mod search;
mod update;

use crate::config::Config;
use crate::error::{Result, WrapErr};
use crate::library::Library;
use config::AppDirs;
use fulltext::FulltextIndexer;

pub use clear_index::ClearIndexCommand;
pub use index::IndexCommand;
pub use info::InfoCommand;
pub use pattern::PatternCommand;
pub use search::SearchCommand;
pub use update::{AddCommand, RemoveCommand};

#[async_trait::async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// 打开文献库对应的全文索引
fn open_indexer(config: &Config, dirs: &AppDirs, library: &Library) -> Result<FulltextIndexer> {
    let index_path = config.index_path(dirs, library.path());
    let fulltext = config.fulltext_for(&library.directory());
    FulltextIndexer::open(&index_path, &fulltext)
        .wrap_err_with(|| format!("无法打开全文索引 {:?}", index_path))
}
