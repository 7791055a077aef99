//! レポート保管先
//!
//! 鉱区フォルダ → 孔フォルダ → ワークブック の3階層。
//! パイプラインはこのトレイト越しに列挙・ダウンロード・リンク取得を行う。

mod local;

pub use local::LocalFileStore;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// 鉱区（名前と保管先でのフォルダID）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineArea {
    pub name: String,
    pub folder_id: String,
}

/// 保管先上の1ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub id: String,
    pub name: String,
}

/// 孔フォルダとその直下のワークブック
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleFolder {
    pub name: String,
    pub files: Vec<FileDescriptor>,
}

pub trait FileStore {
    /// 親フォルダ直下のフォルダを鉱区として列挙
    fn discover_mine_areas(&self, parent_folder_id: &str) -> Result<Vec<MineArea>>;

    /// 鉱区内の孔フォルダ（ワークブックを含むもののみ）
    fn walk_mine_area(&self, area: &MineArea) -> Result<Vec<HoleFolder>>;

    /// `dest_dir` にダウンロードし、保存先を返す
    fn download(&self, file: &FileDescriptor, dest_dir: &Path) -> Result<PathBuf>;

    /// 閲覧用リンク
    fn file_link(&self, file: &FileDescriptor) -> Result<String>;
}
