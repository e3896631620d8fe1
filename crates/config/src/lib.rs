pub mod constants;

pub use etcetera::AppStrategy;
use etcetera::{AppStrategyArgs, choose_app_strategy};

use std::env;
use std::path::PathBuf;

pub fn create_strategy() -> std::result::Result<impl AppStrategy, etcetera::HomeDirError> {
    choose_app_strategy(AppStrategyArgs {
        top_level_domain: constants::TOP_LEVEL_DOMAIN.to_string(),
        author: constants::AUTHOR.to_string(),
        app_name: constants::APP_NAME.to_string(),
    })
}

/// `env_key` wins over the platform directory; the temp dir is the last resort
pub fn resolve_dir<S, F>(env_key: &str, strategy: &S, strategy_fn: F) -> PathBuf
where
    S: AppStrategy,
    F: FnOnce(&S) -> Option<PathBuf>,
{
    env::var_os(env_key)
        .map(PathBuf::from)
        .or_else(|| strategy_fn(strategy))
        .unwrap_or_else(|| env::temp_dir().join(constants::APP_NAME))
}

/// Platform directories used by the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub config: PathBuf,
    pub data: PathBuf,
    pub cache: PathBuf,
}

impl AppDirs {
    pub fn resolve() -> std::result::Result<Self, etcetera::HomeDirError> {
        let strategy = create_strategy()?;
        Ok(Self {
            config: resolve_dir(constants::ENV_CONFIG_DIR, &strategy, |s| {
                Some(s.config_dir())
            }),
            data: resolve_dir(constants::ENV_DATA_DIR, &strategy, |s| Some(s.data_dir())),
            cache: resolve_dir(constants::ENV_CACHE_DIR, &strategy, |s| {
                Some(s.cache_dir())
            }),
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config.join(constants::CONFIG_FILE_NAME)
    }

    /// Default root under which per-collection indexes are created
    pub fn index_root(&self) -> PathBuf {
        self.data.join(constants::INDEX_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let strategy = create_strategy().unwrap();
        let key = "LITSEARCH_TEST_RESOLVE_DIR";
        // SAFETY: the key is unique to this test
        unsafe { env::set_var(key, "/tmp/litsearch-override") };
        let dir = resolve_dir(key, &strategy, |s| Some(s.data_dir()));
        unsafe { env::remove_var(key) };
        assert_eq!(dir, PathBuf::from("/tmp/litsearch-override"));
    }

    #[test]
    fn test_fallback_to_strategy() {
        let strategy = create_strategy().unwrap();
        let dir = resolve_dir("LITSEARCH_TEST_UNSET_KEY", &strategy, |_| {
            Some(PathBuf::from("/from/strategy"))
        });
        assert_eq!(dir, PathBuf::from("/from/strategy"));
    }

    #[test]
    fn test_index_root_is_under_data_dir() {
        let dirs = AppDirs {
            config: PathBuf::from("/c"),
            data: PathBuf::from("/d"),
            cache: PathBuf::from("/k"),
        };
        assert_eq!(dirs.index_root(), PathBuf::from("/d/fulltext-index"));
        assert_eq!(dirs.config_file(), PathBuf::from("/c/litsearch.toml"));
    }
}
