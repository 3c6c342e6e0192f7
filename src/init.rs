// src/init.rs
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{InitError, ScaffoldIoError};

/// プロジェクトテンプレート中のプロジェクト名のプレースホルダ
pub const PROJECT_NAME_PLACEHOLDER: &str = "PROJECTNAME";

/// `.gitignore` はパッケージングで落ちるため `.ignore` として置いている
const IGNORE_FILE: &str = ".ignore";
const GITIGNORE_FILE: &str = ".gitignore";

/// プロジェクトテンプレートを再帰的にコピーして新しいプロジェクトを作る
///
/// - UTF-8 のファイルは `PROJECTNAME` を表示名に置換して書き込む
/// - それ以外 (画像など) はそのままコピーする
/// - 最後に `.ignore` を `.gitignore` にリネームする
///
/// 作成したファイルの一覧を返す。
pub fn init_project(
    template_dir: &Path,
    target_dir: &Path,
    display_name: &str,
    force: bool,
) -> Result<Vec<PathBuf>, InitError> {
    if !template_dir.is_dir() {
        return Err(InitError::TemplateMissing(template_dir.to_path_buf()));
    }
    if target_dir.exists() && !force {
        return Err(InitError::TargetExists(target_dir.to_path_buf()));
    }

    let mut created = Vec::new();
    for entry in WalkDir::new(template_dir).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .unwrap_or(entry.path());
        let dest = target_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)
                .map_err(|e| ScaffoldIoError::new("ディレクトリを作成できません", &dest, e))?;
            continue;
        }

        let bytes = fs::read(entry.path())
            .map_err(|e| ScaffoldIoError::new("テンプレートを読み込めません", entry.path(), e))?;
        let contents = match String::from_utf8(bytes) {
            Ok(text) => text.replace(PROJECT_NAME_PLACEHOLDER, display_name).into_bytes(),
            Err(raw) => raw.into_bytes(),
        };
        fs::write(&dest, contents)
            .map_err(|e| ScaffoldIoError::new("ファイルを書き込めません", &dest, e))?;
        tracing::debug!(file = %dest.display(), "コピーしました");
        created.push(dest);
    }

    let ignore = target_dir.join(IGNORE_FILE);
    if ignore.is_file() {
        let gitignore = target_dir.join(GITIGNORE_FILE);
        fs::rename(&ignore, &gitignore)
            .map_err(|e| ScaffoldIoError::new("リネームできません", &ignore, e))?;
        for path in created.iter_mut().filter(|p| **p == ignore) {
            *path = gitignore.clone();
        }
    }

    Ok(created)
}
