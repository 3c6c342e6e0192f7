// src/model.rs
use serde::Serialize;
use std::ops::Range;

/// 解析した各ルートエントリの情報を保持する構造体
///
/// ルートファイルを読むたびに作り直され、永続化はしない。
/// バイト範囲はすべて解析したソーステキスト基準。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEntry {
    /// ページタイトル (例: "用户设置")。component と揃うと生成対象になる
    pub name: Option<String>,

    /// URL のパス (例: "/setting/user")。書き換えはしない
    pub path: Option<String>,

    /// component フィールドの内容
    pub component: Option<ComponentRef>,

    /// 表形式テンプレートを使う
    pub table: bool,

    /// service ファイルも生成する
    pub service: bool,

    /// 既存ファイルの上書きを許可する。書かれていなければ None
    pub cover: Option<bool>,

    /// 子ルート (children / routes) があれば再帰的に格納
    pub children: Vec<RouteEntry>,

    /// オブジェクトリテラル `{ ... }` 全体の範囲
    pub span: Range<usize>,

    /// 生成専用ディレクティブ (`table` / `service` / `cover`) の `key: value` の範囲
    pub directives: Vec<DirectiveSpan>,
}

impl RouteEntry {
    /// name と文字列の component を両方持つエントリだけがファイル生成の対象。
    /// 生成対象なら (ページタイトル, component の文字列) を返す
    pub fn generatable(&self) -> Option<(&str, &str)> {
        match (&self.name, &self.component) {
            (Some(name), Some(ComponentRef::Path { value, .. })) => Some((name, value)),
            _ => None,
        }
    }
}

/// component フィールドの値の種類
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentRef {
    /// `component: '/users/list'`: まだ生成されていないページ
    Path { value: String, span: Range<usize> },
    /// `component: UsersList`: import 済みの識別子
    Bound { ident: String, span: Range<usize> },
    /// `component: defineComponent(...)` などその他の式。触らない
    Inline,
}

/// 生成専用ディレクティブ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    Table,
    Service,
    Cover,
}

impl Directive {
    pub const ALL: [Directive; 3] = [Directive::Table, Directive::Service, Directive::Cover];

    pub fn key(self) -> &'static str {
        match self {
            Directive::Table => "table",
            Directive::Service => "service",
            Directive::Cover => "cover",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Directive::ALL.into_iter().find(|d| d.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveSpan {
    pub directive: Directive,
    pub span: Range<usize>,
}

/// モジュール先頭の import 宣言
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportLine {
    /// import で束縛されるローカル名 (default / named / namespace すべて)
    pub locals: Vec<String>,
    /// import 元 (例: "@/pages/Kanban")
    pub source: String,
    pub span: Range<usize>,
}

/// ルートファイル 1 つ分の解析結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTable {
    /// ルート配列を束縛している変数名 (例: "routes")
    pub binding: String,
    /// 配列リテラル `[ ... ]` の範囲
    pub array_span: Range<usize>,
    /// トップレベルのルート (ドキュメント順)
    pub entries: Vec<RouteEntry>,
    pub imports: Vec<ImportLine>,
    /// 最後の import 行の行末 (改行の直前)。import がなければ None
    pub import_anchor: Option<usize>,
}

impl RouteTable {
    /// 指定したローカル名を束縛している import を探す
    pub fn import_of(&self, local: &str) -> Option<&ImportLine> {
        self.imports
            .iter()
            .find(|import| import.locals.iter().any(|l| l == local))
    }
}
