use super::{FileDescriptor, FileStore, HoleFolder, MineArea};
use crate::config::render_template;
use crate::error::{PipelineError, Result};
use crate::workbook::is_workbook;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// ローカルのフォルダツリーを保管先として扱う
///
/// ファイルID・フォルダIDはルートからの相対パス（`/` 区切り）。
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    link_template: Option<String>,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            link_template: None,
        }
    }

    /// `{file_id}` を含むリンクテンプレート
    pub fn with_link_template(mut self, template: Option<String>) -> Self {
        self.link_template = template;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn relative_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// 直下のサブフォルダ（名前順）
    fn subfolders(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if !folder.is_dir() {
            return Err(PipelineError::FolderNotFound(folder.display().to_string()));
        }

        let mut dirs: Vec<PathBuf> = WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

impl FileStore for LocalFileStore {
    fn discover_mine_areas(&self, parent_folder_id: &str) -> Result<Vec<MineArea>> {
        let parent = self.resolve(parent_folder_id);
        let areas: Vec<MineArea> = self
            .subfolders(&parent)?
            .into_iter()
            .map(|dir| MineArea {
                name: file_name_of(&dir),
                folder_id: self.relative_id(&dir),
            })
            .collect();

        tracing::info!(parent = %parent.display(), count = areas.len(), "Discovered mine areas");
        Ok(areas)
    }

    fn walk_mine_area(&self, area: &MineArea) -> Result<Vec<HoleFolder>> {
        let folder = self.resolve(&area.folder_id);
        let mut holes = Vec::new();

        for hole_dir in self.subfolders(&folder)? {
            // 孔フォルダ直下のみ（再帰しない）
            let mut files: Vec<FileDescriptor> = WalkDir::new(&hole_dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_workbook(e.path()))
                .map(|e| FileDescriptor {
                    id: self.relative_id(e.path()),
                    name: file_name_of(e.path()),
                })
                .collect();

            if files.is_empty() {
                continue;
            }
            files.sort_by(|a, b| a.name.cmp(&b.name));

            tracing::debug!(hole = %file_name_of(&hole_dir), files = files.len(), "Found hole folder");
            holes.push(HoleFolder {
                name: file_name_of(&hole_dir),
                files,
            });
        }

        Ok(holes)
    }

    fn download(&self, file: &FileDescriptor, dest_dir: &Path) -> Result<PathBuf> {
        let source = self.resolve(&file.id);
        if !source.is_file() {
            return Err(PipelineError::FileNotFound(source.display().to_string()));
        }

        std::fs::create_dir_all(dest_dir)?;
        let dest = dest_dir.join(&file.name);
        std::fs::copy(&source, &dest)?;
        Ok(dest)
    }

    fn file_link(&self, file: &FileDescriptor) -> Result<String> {
        if let Some(template) = &self.link_template {
            return Ok(render_template(template, &[("file_id", file.id.as_str())]));
        }

        let source = self.resolve(&file.id);
        let absolute = if source.is_absolute() {
            source
        } else {
            std::env::current_dir()?.join(source)
        };
        Ok(format!("file://{}", absolute.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn build_tree(root: &Path) {
        for (dir, files) in [
            ("UP-B/T3", vec!["Report T3 5_10.xlsx", "Report T3 0_5.xlsx", "notes.txt"]),
            ("UP-B/T1", vec!["Report T1 0_5.xls"]),
            ("UP-B/Empty", vec!["readme.md"]),
            ("North", vec![]),
        ] {
            fs::create_dir_all(root.join(dir)).unwrap();
            for file in files {
                fs::write(root.join(dir).join(file), b"dummy").unwrap();
            }
        }
    }

    #[test]
    fn test_discover_mine_areas() {
        let dir = tempdir().unwrap();
        build_tree(dir.path());
        let store = LocalFileStore::new(dir.path());

        let areas = store.discover_mine_areas("").unwrap();
        let names: Vec<&str> = areas.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["North", "UP-B"]);
        assert_eq!(areas[1].folder_id, "UP-B");
    }

    #[test]
    fn test_walk_mine_area() {
        let dir = tempdir().unwrap();
        build_tree(dir.path());
        let store = LocalFileStore::new(dir.path());
        let area = MineArea { name: "UP-B".into(), folder_id: "UP-B".into() };

        let holes = store.walk_mine_area(&area).unwrap();
        // ワークブックの無いフォルダは除外、名前順
        let names: Vec<&str> = holes.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["T1", "T3"]);
        assert_eq!(holes[1].files.len(), 2);
        assert_eq!(holes[1].files[0].name, "Report T3 0_5.xlsx");
        assert_eq!(holes[1].files[0].id, "UP-B/T3/Report T3 0_5.xlsx");
    }

    #[test]
    fn test_walk_missing_area() {
        let dir = tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let area = MineArea { name: "X".into(), folder_id: "X".into() };
        assert!(matches!(
            store.walk_mine_area(&area),
            Err(PipelineError::FolderNotFound(_))
        ));
    }

    #[test]
    fn test_download_and_link() {
        let dir = tempdir().unwrap();
        build_tree(dir.path());
        let dest = tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let file = FileDescriptor {
            id: "UP-B/T1/Report T1 0_5.xls".into(),
            name: "Report T1 0_5.xls".into(),
        };

        let local = store.download(&file, dest.path()).unwrap();
        assert_eq!(fs::read(&local).unwrap(), b"dummy");
        assert!(store.file_link(&file).unwrap().starts_with("file://"));

        let store = store.with_link_template(Some("https://files.example/{file_id}".into()));
        assert_eq!(
            store.file_link(&file).unwrap(),
            "https://files.example/UP-B/T1/Report T1 0_5.xls"
        );
    }
}
