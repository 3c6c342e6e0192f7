// src/config.rs
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::resolver::resolve_project_path;

/// package.json に routes の指定がない場合のルートファイル
pub const DEFAULT_ROUTES_PATH: &str = "/src/routes/index.tsx";
/// 生成したページを置くディレクトリ (プロジェクトルート基準)
pub const PAGES_ROOT: &str = "src/pages";
/// ページを import するときのエイリアス
pub const PAGES_ALIAS: &str = "@/pages";

/// package.json のうち、このツールが読むキーだけ
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    routes: Option<String>,
    template: Option<String>,
}

/// ルート生成に必要な設定 (すべて絶対パス)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    /// ルートファイル
    pub routes_file: PathBuf,
    /// 表示用のルートファイルのパス (設定に書かれたまま)
    pub routes_display: String,
    /// テンプレートディレクトリ。None なら同梱テンプレート
    pub template_dir: Option<PathBuf>,
    pub pages_root: PathBuf,
    pub pages_alias: String,
}

/// CLI から渡される上書き指定
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub routes: Option<String>,
    pub template: Option<String>,
}

impl ProjectConfig {
    /// `<project_root>/package.json` の `routes` / `template` を読み、CLI 指定で上書きする
    ///
    /// package.json がなければ既定値を使う。壊れていればエラー。
    pub fn load(project_root: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let manifest = read_manifest(&project_root.join("package.json"))?;

        let routes_display = overrides
            .routes
            .clone()
            .or(manifest.routes)
            .unwrap_or_else(|| DEFAULT_ROUTES_PATH.to_string());
        let template = overrides.template.clone().or(manifest.template);

        let routes_file = resolve_project_path(project_root, &routes_display)?;
        let template_dir = template
            .map(|dir| resolve_project_path(project_root, &dir))
            .transpose()?;
        let pages_root = resolve_project_path(project_root, PAGES_ROOT)?;

        tracing::debug!(
            routes = %routes_file.display(),
            template = ?template_dir,
            "プロジェクト設定を読み込みました"
        );

        Ok(ProjectConfig {
            routes_file,
            routes_display,
            template_dir,
            pages_root,
            pages_alias: PAGES_ALIAS.to_string(),
        })
    }
}

fn read_manifest(path: &Path) -> Result<PackageManifest, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "package.json がないため既定値を使います");
            return Ok(PackageManifest::default());
        }
        Err(source) => {
            return Err(ConfigError::Manifest {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text).map_err(|source| ConfigError::ManifestJson {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_package_json() {
        let tmp = TempDir::new().unwrap();
        let config = ProjectConfig::load(tmp.path(), &Overrides::default()).unwrap();

        assert_eq!(config.routes_file, tmp.path().join("src/routes/index.tsx"));
        assert_eq!(config.routes_display, DEFAULT_ROUTES_PATH);
        assert_eq!(config.template_dir, None);
        assert_eq!(config.pages_root, tmp.path().join("src/pages"));
        assert_eq!(config.pages_alias, "@/pages");
    }

    #[test]
    fn reads_routes_and_template_from_package_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{ "name": "demo", "routes": "/src/router.tsx", "template": "scaffold/pages", "dependencies": {} }"#,
        )
        .unwrap();

        let config = ProjectConfig::load(tmp.path(), &Overrides::default()).unwrap();
        assert_eq!(config.routes_file, tmp.path().join("src/router.tsx"));
        assert_eq!(config.template_dir, Some(tmp.path().join("scaffold/pages")));
    }

    #[test]
    fn cli_overrides_win_over_package_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), r#"{ "routes": "/src/router.tsx" }"#).unwrap();

        let overrides = Overrides {
            routes: Some("src/other.tsx".to_string()),
            template: None,
        };
        let config = ProjectConfig::load(tmp.path(), &overrides).unwrap();
        assert_eq!(config.routes_file, tmp.path().join("src/other.tsx"));
    }

    #[test]
    fn malformed_package_json_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{ routes: ").unwrap();
        let err = ProjectConfig::load(tmp.path(), &Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::ManifestJson { .. }));
    }
}
