// src/scaffold.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ScaffoldIoError};
use crate::resolver::PagePlan;

/// テンプレート中のページタイトルのプレースホルダ
pub const TITLE_PLACEHOLDER: &str = "HEADERTITLE";
/// テンプレート中のコンポーネント名のプレースホルダ
pub const COMPONENT_PLACEHOLDER: &str = "COMPONENT";

pub const COMPONENT_FILE: &str = "index.tsx";
pub const TABLE_FILE: &str = "table.tsx";
pub const SERVICE_FILE: &str = "service.tsx";

/// ページ生成用のテンプレート 3 種
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    /// 空のページ
    pub blank: String,
    /// 表形式のページ
    pub table: String,
    pub service: String,
}

impl TemplateSet {
    /// バイナリに同梱しているテンプレート
    pub fn bundled() -> Self {
        TemplateSet {
            blank: include_str!("../templates/blank/index.tsx").to_string(),
            table: include_str!("../templates/blank/table.tsx").to_string(),
            service: include_str!("../templates/blank/service.tsx").to_string(),
        }
    }

    /// プロジェクト側のテンプレートディレクトリから読み込む (3 ファイルとも必須)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let read = |file: &str| {
            let path = dir.join(file);
            fs::read_to_string(&path).map_err(|source| ConfigError::Template { path, source })
        };
        Ok(TemplateSet {
            blank: read(COMPONENT_FILE)?,
            table: read(TABLE_FILE)?,
            service: read(SERVICE_FILE)?,
        })
    }

    /// ディレクトリ指定があれば読み込み、なければ同梱テンプレート
    pub fn from_dir(dir: Option<&Path>) -> Result<Self, ConfigError> {
        match dir {
            Some(dir) => Self::load(dir),
            None => Ok(Self::bundled()),
        }
    }

    pub fn render_component(&self, plan: &PagePlan) -> String {
        let template = if plan.table { &self.table } else { &self.blank };
        render(template, &plan.name, &plan.component_name)
    }

    pub fn render_service(&self, plan: &PagePlan) -> String {
        render(&self.service, &plan.name, &plan.component_name)
    }
}

/// プレースホルダをそのまま置換する
pub fn render(template: &str, title: &str, component: &str) -> String {
    template
        .replace(TITLE_PLACEHOLDER, title)
        .replace(COMPONENT_PLACEHOLDER, component)
}

/// 書き込み結果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// 既に存在し cover 指定もないため書かなかったファイル
    pub skipped: Vec<PathBuf>,
}

impl WriteReport {
    pub fn merge(&mut self, other: WriteReport) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
    }
}

/// ページファイルを書き出す
pub struct Scaffolder {
    pages_root: PathBuf,
    templates: TemplateSet,
}

impl Scaffolder {
    pub fn new(pages_root: impl Into<PathBuf>, templates: TemplateSet) -> Self {
        Scaffolder {
            pages_root: pages_root.into(),
            templates,
        }
    }

    /// 1 ページ分の書き込み先 (コンポーネントファイルと、service 指定があれば service ファイル)
    pub fn target_files(&self, plan: &PagePlan) -> Vec<PathBuf> {
        let dir = plan.page.to_dir(&self.pages_root);
        let mut files = vec![dir.join(COMPONENT_FILE)];
        if plan.service {
            files.push(dir.join(SERVICE_FILE));
        }
        files
    }

    /// 既存ファイルを上書きするか決められないページがあればエラーにする
    ///
    /// `cover` を書いていないページの書き込み先が既に存在する場合。何も書かないうちに呼ぶ。
    pub fn check_overwrites(&self, plans: &[PagePlan]) -> Result<(), ConfigError> {
        for plan in plans.iter().filter(|plan| plan.cover.is_none()) {
            if let Some(path) = self.target_files(plan).into_iter().find(|path| path.exists()) {
                return Err(ConfigError::CoverUnspecified {
                    page: plan.page.to_string(),
                    path,
                });
            }
        }
        Ok(())
    }

    /// 計画順 (深さ優先・ドキュメント順) にすべてのページを書き出す
    ///
    /// 最初の I/O エラーで中断する。書き込み済みのファイルはそのまま残る。
    pub fn scaffold_all(&self, plans: &[PagePlan]) -> Result<WriteReport, ScaffoldIoError> {
        let mut report = WriteReport::default();
        for plan in plans {
            report.merge(self.scaffold(plan)?);
        }
        Ok(report)
    }

    /// 1 ページ分: コンポーネントファイルと (service 指定があれば) service ファイル
    ///
    /// 各ファイルは「存在しない」か「存在して cover が true」のときだけ書く。
    pub fn scaffold(&self, plan: &PagePlan) -> Result<WriteReport, ScaffoldIoError> {
        let dir = plan.page.to_dir(&self.pages_root);
        let mut report = WriteReport::default();

        fs::create_dir_all(&dir)
            .map_err(|e| ScaffoldIoError::new("ディレクトリを作成できません", &dir, e))?;

        for path in self.target_files(plan) {
            let file = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if !should_write(&path, plan.cover) {
                tracing::info!(page = %plan.page, "{} は既に存在するためスキップします", file);
                report.skipped.push(path);
                continue;
            }
            let contents = if file == SERVICE_FILE {
                self.templates.render_service(plan)
            } else {
                self.templates.render_component(plan)
            };
            write_file(&path, &contents, plan)?;
            report.written.push(path);
        }

        Ok(report)
    }
}

fn should_write(path: &Path, cover: Option<bool>) -> bool {
    !path.exists() || cover == Some(true)
}

fn write_file(path: &Path, contents: &str, plan: &PagePlan) -> Result<(), ScaffoldIoError> {
    let file = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    tracing::info!("{}/{} 作成中. . .", plan.component_name, file);
    fs::write(path, contents)
        .map_err(|e| ScaffoldIoError::new("ファイルを書き込めません", path, e))?;
    tracing::info!("{}/{} 作成完了", plan.component_name, file);
    Ok(())
}
