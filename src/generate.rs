// src/generate.rs
use std::fs;
use std::path::Path;

use crate::config::ProjectConfig;
use crate::error::{ConfigError, GenerateError, ScaffoldIoError};
use crate::parser::{parse_route_table, Dialect};
use crate::resolver::{plan_pages, Bindings};
use crate::rewriter::rewrite;
use crate::scaffold::{Scaffolder, TemplateSet, WriteReport};

/// `router` コマンドの実行結果
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub files: WriteReport,
    pub imports_added: Vec<String>,
    /// ルートファイルを書き換えたか
    pub routes_updated: bool,
}

impl GenerateReport {
    /// 何も変更しなかった (再実行しても同じ状態)
    pub fn is_noop(&self) -> bool {
        self.files.written.is_empty() && !self.routes_updated
    }
}

/// ルートファイルからページを生成し、ルートファイルを書き換える
///
/// 解析・計画・書き換えテキストの作成までを先に済ませ、失敗すれば何も書かない。
/// その後ページファイルを深さ優先・ドキュメント順に書き、最後にルートファイルを
/// 内容が変わった場合だけ 1 回書き込む。
pub fn generate_routes(config: &ProjectConfig) -> Result<GenerateReport, GenerateError> {
    // 1) ルートファイルの存在確認 (なければ何も触らずに終了)
    if !config.routes_file.is_file() {
        return Err(ConfigError::RoutesFileMissing(config.routes_file.clone()).into());
    }
    let templates = TemplateSet::from_dir(config.template_dir.as_deref())?;

    let source = fs::read_to_string(&config.routes_file).map_err(|source| ConfigError::RoutesFileRead {
        path: config.routes_file.clone(),
        source,
    })?;

    // 2) 解析して生成対象ページを列挙
    let table = parse_route_table(&source, Dialect::from_path(&config.routes_file)).map_err(
        |source| GenerateError::Parse {
            path: config.routes_file.clone(),
            source,
        },
    )?;
    let bindings = Bindings::from_table(&table, &config.pages_alias);
    let plans = plan_pages(&table, &bindings, &config.pages_alias)?;

    // 3) 書き換え後のテキストを作っておく (ディスクにはまだ触らない)
    let rewritten = rewrite(&source, &table, &plans, &config.pages_alias)?;

    // 4) ページファイルの生成 (上書きの可否が決まっていなければ何も書かない)
    let scaffolder = Scaffolder::new(&config.pages_root, templates);
    scaffolder.check_overwrites(&plans)?;
    let files = scaffolder.scaffold_all(&plans)?;

    // 5) ルートファイルの書き戻し
    if rewritten.changed {
        tracing::info!("{} 更新中. . .", config.routes_display);
        write_routes(&config.routes_file, &rewritten.text)?;
        tracing::info!("{} 更新完了", config.routes_display);
    }

    Ok(GenerateReport {
        files,
        imports_added: rewritten.imports_added,
        routes_updated: rewritten.changed,
    })
}

fn write_routes(path: &Path, text: &str) -> Result<(), ScaffoldIoError> {
    fs::write(path, text).map_err(|e| ScaffoldIoError::new("ルートファイルを書き込めません", path, e))
}
