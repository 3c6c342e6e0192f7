use path_absolutize::Absolutize;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, InvalidPathError};
use crate::ident::derive_binding;
use crate::model::{ComponentRef, RouteEntry, RouteTable};

/// ページルートからの相対パス (常に `/a/b` の形に正規化済み)
///
/// ルートそのものは空文字列で表す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PagePath(String);

impl PagePath {
    pub fn root() -> Self {
        PagePath(String::new())
    }

    /// `./users//list/` → `/users/list`。`..` と空パスは拒否する
    pub fn parse(raw: &str) -> Result<Self, InvalidPathError> {
        let mut normalized = String::new();
        for segment in raw.split('/').map(str::trim) {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(InvalidPathError {
                        path: raw.to_string(),
                        reason: "`..` でページディレクトリの外を指すことはできません",
                    });
                }
                _ => {
                    normalized.push('/');
                    normalized.push_str(segment);
                }
            }
        }
        if normalized.is_empty() {
            return Err(InvalidPathError {
                path: raw.to_string(),
                reason: "空のパスです",
            });
        }
        Ok(PagePath(normalized))
    }

    pub fn join(&self, child: &PagePath) -> PagePath {
        PagePath(format!("{}{}", self.0, child.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments().last()
    }

    /// ページルート配下の実ディレクトリ
    pub fn to_dir(&self, pages_root: &Path) -> PathBuf {
        self.segments()
            .fold(pages_root.to_path_buf(), |dir, segment| dir.join(segment))
    }

    /// `@/pages` + `/users/list` → `@/pages/users/list`
    pub fn import_source(&self, alias: &str) -> String {
        format!("{}{}", alias.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

/// import 済みの識別子 → ページパスの対応
///
/// `import Kanban from '@/pages/Kanban'` のように alias 配下を指す import だけを集める。
#[derive(Debug, Default)]
pub struct Bindings(HashMap<String, PagePath>);

impl Bindings {
    pub fn from_table(table: &RouteTable, alias: &str) -> Self {
        let prefix = alias.trim_end_matches('/');
        let mut map = HashMap::new();
        for import in &table.imports {
            let Some(rest) = import.source.strip_prefix(prefix) else {
                continue;
            };
            if !(rest.is_empty() || rest.starts_with('/')) {
                continue;
            }
            let Ok(page) = PagePath::parse(rest) else {
                continue;
            };
            for local in &import.locals {
                map.insert(local.clone(), page.clone());
            }
        }
        Bindings(map)
    }

    pub fn get(&self, ident: &str) -> Option<&PagePath> {
        self.0.get(ident)
    }
}

/// 生成対象 1 ページ分の計画
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// ページタイトル (HEADERTITLE に入る)
    pub name: String,
    /// ページルートからのディレクトリ
    pub page: PagePath,
    /// import で束縛する識別子 (ページパス全体から導出)
    pub identifier: String,
    /// テンプレート内の COMPONENT に入る名前 (最後のセグメントから導出)
    pub component_name: String,
    /// ソース上の `'/users/list'` の範囲
    pub component_span: Range<usize>,
    pub table: bool,
    pub service: bool,
    pub cover: Option<bool>,
}

/// エントリ自身の生成先と、子ルートに渡す基準パス
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub page: Option<PagePath>,
    pub child_base: PagePath,
}

/// 1 エントリ分の生成先を決める
///
/// - 生成対象: 親の基準パス + 自分の component
/// - import 済み (`component: Kanban`): import 元のページパスを子の基準にする
/// - それ以外: 親の基準パスをそのまま子に渡す
pub fn resolve_entry(
    entry: &RouteEntry,
    base: &PagePath,
    bindings: &Bindings,
) -> Result<Resolved, InvalidPathError> {
    if let Some((_, component)) = entry.generatable() {
        let page = base.join(&PagePath::parse(component)?);
        return Ok(Resolved {
            page: Some(page.clone()),
            child_base: page,
        });
    }
    let child_base = match &entry.component {
        Some(ComponentRef::Bound { ident, .. }) => {
            bindings.get(ident).cloned().unwrap_or_else(|| base.clone())
        }
        _ => base.clone(),
    };
    Ok(Resolved {
        page: None,
        child_base,
    })
}

/// ルートツリー全体を深さ優先・ドキュメント順にたどり、生成対象ページを列挙する
///
/// 識別子の衝突 (別々のページが同じ識別子になる、または同名の識別子が
/// 別の import 元から既に import されている) は設定エラーとして返す。
pub fn plan_pages(
    table: &RouteTable,
    bindings: &Bindings,
    alias: &str,
) -> Result<Vec<PagePlan>, ConfigError> {
    let mut plans = Vec::new();
    collect_pages(&table.entries, &PagePath::root(), bindings, &mut plans)?;

    let mut seen: HashMap<&str, &PagePath> = HashMap::new();
    for plan in &plans {
        if let Some(first) = seen.insert(&plan.identifier, &plan.page) {
            if first != &plan.page {
                return Err(ConfigError::IdentifierCollision {
                    identifier: plan.identifier.clone(),
                    first: first.to_string(),
                    second: plan.page.to_string(),
                });
            }
        }
        if let Some(existing) = table.import_of(&plan.identifier) {
            if existing.source != plan.page.import_source(alias) {
                return Err(ConfigError::IdentifierCollision {
                    identifier: plan.identifier.clone(),
                    first: existing.source.clone(),
                    second: plan.page.to_string(),
                });
            }
        }
    }
    Ok(plans)
}

fn collect_pages(
    entries: &[RouteEntry],
    base: &PagePath,
    bindings: &Bindings,
    plans: &mut Vec<PagePlan>,
) -> Result<(), InvalidPathError> {
    for entry in entries {
        // 1) 自分自身の生成先
        let resolved = resolve_entry(entry, base, bindings)?;
        if let (Some(page), Some((name, _)), Some(ComponentRef::Path { span, .. })) =
            (&resolved.page, entry.generatable(), &entry.component)
        {
            let last = page.last_segment().unwrap_or_default();
            plans.push(PagePlan {
                name: name.to_string(),
                page: page.clone(),
                identifier: derive_binding(page.as_str())?,
                component_name: derive_binding(last)?,
                component_span: span.clone(),
                table: entry.table,
                service: entry.service,
                cover: entry.cover,
            });
        }

        // 2) children があれば、その子要素についても再帰的に処理
        if !entry.children.is_empty() {
            collect_pages(&entry.children, &resolved.child_base, bindings, plans)?;
        }
    }
    Ok(())
}

/// プロジェクトルート基準の設定パスを絶対パスにする
///
/// `/src/routes/index.tsx` のように先頭が `/` でもプロジェクトルートからの相対とみなす。
pub fn resolve_project_path(project_root: &Path, relative: &str) -> Result<PathBuf, ConfigError> {
    let joined = project_root.join(relative.trim_start_matches(['/', '\\']));
    let abs = joined
        .absolutize()
        .map_err(|source| ConfigError::Absolutize {
            path: joined.clone(),
            source,
        })?
        .to_path_buf();
    Ok(abs)
}
