// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// コンポーネントパスが空、または `..` を含むなどページパスとして扱えない
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("無効なコンポーネントパス {path:?}: {reason}")]
pub struct InvalidPathError {
    pub path: String,
    pub reason: &'static str,
}

/// ルートファイルの解析エラー
///
/// 位置情報 (1 始まりの行・列) と、該当行のテキストを保持する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `: Type[] = [` 形式のルート配列が見つからない
    #[error("ルート配列 (`const routes: RouteProps[] = [...]`) が見つかりません")]
    MissingRouteArray,

    /// TypeScript としての構文エラー
    #[error("{line}:{column} 構文エラー: {message}\n    | {snippet}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        snippet: String,
    },

    /// 既知フィールドの値がリテラルとして評価できない
    #[error("{line}:{column} フィールド `{field}` が不正です: {reason}\n    | {snippet}")]
    InvalidField {
        field: String,
        line: usize,
        column: usize,
        reason: String,
        snippet: String,
    },
}

/// プロジェクト設定 (package.json / CLI 指定) に関するエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path:?} を読み込めません: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} の JSON が不正です: {source}")]
    ManifestJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ルートファイル {0:?} が存在しません")]
    RoutesFileMissing(PathBuf),

    #[error("ルートファイル {path:?} を読み込めません: {source}")]
    RoutesFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("テンプレート {path:?} を読み込めません: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} を絶対パスに変換できません: {source}")]
    Absolutize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 異なるページが同じ識別子に変換される
    #[error("識別子 `{identifier}` が衝突しています: {first} と {second}")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    /// 既存ファイルがあるのに `cover` が書かれていない
    #[error("{path:?} は既に存在します。ページ {page} に `cover: true` (上書き) か `cover: false` (残す) を指定してください")]
    CoverUnspecified { page: String, path: PathBuf },

    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),
}

/// ディレクトリ作成・ファイル書き込みの失敗。書き込み済みのファイルは巻き戻さない。
#[derive(Debug, Error)]
#[error("{action} {path:?}: {source}")]
pub struct ScaffoldIoError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl ScaffoldIoError {
    pub fn new(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScaffoldIoError {
            action,
            path: path.into(),
            source,
        }
    }
}

/// 書き換え対象が想定位置に見つからない (解析後にテキストが変わった等)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("{offset} バイト目に component の文字列リテラルがありません (実際: {found:?})")]
    ComponentMismatch { offset: usize, found: String },

    #[error("{offset} バイト目にディレクティブ `{key}` がありません (実際: {found:?})")]
    DirectiveMismatch {
        key: &'static str,
        offset: usize,
        found: String,
    },

    #[error("書き換え範囲が重なっています: {first:?} と {second:?}")]
    OverlappingEdits {
        first: std::ops::Range<usize>,
        second: std::ops::Range<usize>,
    },

    #[error("書き換え範囲 {0:?} がソースの範囲外です")]
    OutOfBounds(std::ops::Range<usize>),
}

/// `init` コマンドのエラー
#[derive(Debug, Error)]
pub enum InitError {
    #[error("テンプレートディレクトリ {0:?} が存在しません")]
    TemplateMissing(PathBuf),

    #[error("{0:?} は既に存在します (上書きする場合は --force を指定してください)")]
    TargetExists(PathBuf),

    #[error("テンプレートの走査に失敗しました: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Io(#[from] ScaffoldIoError),
}

/// ルート生成処理 (`router` コマンド) 全体のエラー
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{path:?} の解析に失敗しました: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Scaffold(#[from] ScaffoldIoError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl GenerateError {
    /// プロセスの終了コード
    ///
    /// 0 は成功、2 は設定エラー (ルートファイルなしを含む)、3 は解析エラー、
    /// 4 はファイル書き込みエラー、5 は書き換えの整合性エラー。
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::Config(_) => 2,
            GenerateError::Parse { .. } => 3,
            GenerateError::Scaffold(_) => 4,
            GenerateError::Rewrite(_) => 5,
        }
    }
}
