// fulltext/src/store.rs
//! 索引存储 - 打开、校验与恢复
//!
//! 索引目录中除 Tantivy 自身文件外还有一个 `index-meta.json`，记录 Schema 版本。
//! - 版本不符：清空目录并重建空索引
//! - 元数据缺失或损坏：保留已有内容，只重写元数据
//! - Tantivy 无法打开、IO 失败：返回错误，不动目录
//!
//! 调用方根据 [`IndexStore::needs_rebuild`] 决定是否全量重建。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tantivy::directory::MmapDirectory;
use tantivy::{Index, IndexReader, ReloadPolicy};

use crate::error::Result;
use crate::schema::{build_schema, register_tokenizer, SchemaFields, SCHEMA_VERSION};

pub const META_FILE_NAME: &str = "index-meta.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub schema_version: u32,
}

/// 元数据文件的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaState {
    Missing,
    Unreadable,
    Version(u32),
}

/// 打开的索引存储
pub struct IndexStore {
    path: PathBuf,
    pub index: Index,
    pub reader: IndexReader,
    pub fields: SchemaFields,
    needs_rebuild: bool,
}

impl IndexStore {
    /// 打开索引目录，不存在时创建
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        match read_meta(path)? {
            MetaState::Version(SCHEMA_VERSION) => Self::create(path, false),
            MetaState::Version(version) => {
                tracing::warn!(
                    "索引版本 {} 与当前版本 {} 不兼容，清空后重建: {:?}",
                    version,
                    SCHEMA_VERSION,
                    path
                );
                wipe(path)?;
                let store = Self::create(path, true)?;
                write_meta(path)?;
                Ok(store)
            }
            MetaState::Missing | MetaState::Unreadable => {
                let mut store = Self::create(path, false)?;
                write_meta(path)?;
                // 目录里已有 Tantivy 索引但缺少元数据文件时，内容仍然可用
                store.needs_rebuild = store.num_docs() == 0;
                Ok(store)
            }
        }
    }

    fn create(path: &Path, needs_rebuild: bool) -> Result<Self> {
        let schema = build_schema();
        let index = Index::open_or_create(MmapDirectory::open(path)?, schema.clone())?;
        register_tokenizer(&index);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let fields = SchemaFields::from_schema(&schema)?;

        Ok(Self {
            path: path.to_path_buf(),
            index,
            reader,
            fields,
            needs_rebuild,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 索引为新建或刚被清空，内容可能落后于文献库
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

fn read_meta(path: &Path) -> Result<MetaState> {
    let content = match fs::read_to_string(path.join(META_FILE_NAME)) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MetaState::Missing),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_str::<IndexMeta>(&content) {
        Ok(meta) => Ok(MetaState::Version(meta.schema_version)),
        Err(e) => {
            tracing::warn!("索引元数据损坏，将重写: {}", e);
            Ok(MetaState::Unreadable)
        }
    }
}

/// 先写临时文件再改名，中断时不会留下半个文件
fn write_meta(path: &Path) -> Result<()> {
    let meta = IndexMeta {
        schema_version: SCHEMA_VERSION,
    };
    let tmp = path.join(format!("{}.tmp", META_FILE_NAME));
    fs::write(&tmp, serde_json::to_vec_pretty(&meta)?)?;
    fs::rename(&tmp, path.join(META_FILE_NAME))?;
    Ok(())
}

/// 删除目录内所有内容，保留目录本身
fn wipe(path: &Path) -> Result<()> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}
