// apps/cli/src/command/pattern.rs
//! 输出高亮用的正则表达式

use super::Command;
use crate::cli::FlagArgs;
use crate::config::Config;
use crate::error::{Result, error};
use query::SearchQuery;

pub struct PatternCommand {
    config: Config,
    query: String,
    flags: FlagArgs,
    javascript: bool,
}

impl PatternCommand {
    pub fn new(config: Config, query: String, flags: FlagArgs, javascript: bool) -> Self {
        Self {
            config,
            query,
            flags,
            javascript,
        }
    }
}

#[async_trait::async_trait]
impl Command for PatternCommand {
    async fn execute(&self) -> Result<()> {
        let query = SearchQuery::new(self.query.as_str(), self.config.flags(self.flags));
        if let Some(e) = query.pattern_error() {
            return Err(error!("无效的查询: {}", e));
        }

        let pattern = if self.javascript {
            query.javascript_pattern_for_words()
        } else {
            query.pattern_for_words()
        };

        match pattern {
            Some(pattern) => println!("{}", pattern),
            None => eprintln!("查询中没有可高亮的词"),
        }
        Ok(())
    }
}
