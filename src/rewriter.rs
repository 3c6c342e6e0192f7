// src/rewriter.rs
//! ルートファイルのテキストを書き換える
//!
//! 解析時に記録したバイト範囲だけを編集し、それ以外はバイト単位でそのまま残す。
//! ディスクには触らない。

use std::collections::HashSet;
use std::ops::Range;

use crate::error::RewriteError;
use crate::model::{DirectiveSpan, RouteEntry, RouteTable};
use crate::resolver::PagePlan;

/// 書き換え結果
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub text: String,
    /// 新たに挿入した import 文 (挿入順)
    pub imports_added: Vec<String>,
    pub changed: bool,
}

#[derive(Debug, Clone)]
struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// ルート配列を書き換える
///
/// 1) 生成対象の `component: '/path'` を `component: Identifier` に置き換える
/// 2) すべてのエントリから `table` / `service` / `cover` を取り除く
/// 3) 足りない import 文を最後の import 行の直後に追加する
pub fn rewrite(
    source: &str,
    table: &RouteTable,
    plans: &[PagePlan],
    alias: &str,
) -> Result<Rewrite, RewriteError> {
    let mut edits = Vec::new();

    for plan in plans {
        edits.push(replace_component(source, plan)?);
    }

    for entry in walk_entries(&table.entries) {
        edits.extend(directive_edits(source, &entry.directives)?);
    }

    let eol = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let imports_added = missing_imports(table, plans, alias);
    if !imports_added.is_empty() {
        let at = table.import_anchor.unwrap_or(0);
        let replacement = match table.import_anchor {
            Some(_) => imports_added.iter().map(|line| format!("{eol}{line}")).collect(),
            None => imports_added.iter().map(|line| format!("{line}{eol}")).collect(),
        };
        edits.push(Edit {
            range: at..at,
            replacement,
        });
    }

    let changed = !edits.is_empty();
    let text = apply_edits(source, edits)?;
    Ok(Rewrite {
        text,
        imports_added,
        changed,
    })
}

fn replace_component(source: &str, plan: &PagePlan) -> Result<Edit, RewriteError> {
    let span = plan.component_span.clone();
    let found = source.get(span.clone()).unwrap_or_default();
    let quoted = found.len() >= 2
        && matches!(found.chars().next(), Some('\'' | '"' | '`'))
        && found.chars().next() == found.chars().last();
    if !quoted {
        return Err(RewriteError::ComponentMismatch {
            offset: span.start,
            found: found.to_string(),
        });
    }
    Ok(Edit {
        range: span,
        replacement: plan.identifier.clone(),
    })
}

/// ツリー全体のエントリを深さ優先で列挙する
fn walk_entries(entries: &[RouteEntry]) -> Vec<&RouteEntry> {
    let mut out = Vec::new();
    for entry in entries {
        out.push(entry);
        out.extend(walk_entries(&entry.children));
    }
    out
}

/// 1 エントリ分のディレクティブ削除
///
/// `table: true, service: true` のように隣り合うディレクティブはまとめて 1 つの範囲として扱う。
fn directive_edits(source: &str, directives: &[DirectiveSpan]) -> Result<Vec<Edit>, RewriteError> {
    let mut spans = Vec::with_capacity(directives.len());
    for directive in directives {
        spans.push(check_directive(source, directive)?);
    }
    spans.sort_by_key(|span| span.start);

    let mut groups: Vec<Range<usize>> = Vec::new();
    for span in spans {
        if let Some(last) = groups.last_mut() {
            if span.start < last.end {
                return Err(RewriteError::OverlappingEdits {
                    first: last.clone(),
                    second: span,
                });
            }
            if source[last.end..span.start].trim_matches([' ', '\t']) == "," {
                last.end = span.end;
                continue;
            }
        }
        groups.push(span);
    }

    Ok(groups
        .into_iter()
        .map(|group| Edit {
            range: removal_range(source, group),
            replacement: String::new(),
        })
        .collect())
}

/// 記録した範囲がまだ `key: value` を指しているか確認する
fn check_directive(source: &str, directive: &DirectiveSpan) -> Result<Range<usize>, RewriteError> {
    let key = directive.directive.key();
    let span = directive.span.clone();
    let found = source.get(span.clone()).unwrap_or_default();
    let key_matches = found.starts_with(key)
        || found.starts_with(&format!("'{key}'"))
        || found.starts_with(&format!("\"{key}\""));
    if !key_matches {
        return Err(RewriteError::DirectiveMismatch {
            key,
            offset: span.start,
            found: found.lines().next().unwrap_or_default().to_string(),
        });
    }
    Ok(span)
}

/// プロパティ (群) の削除範囲を決める
///
/// 行にそれしかなければ行ごと (改行を含めて) 削除し、
/// 他のプロパティと同じ行にあれば区切りのカンマと一緒に削除する。
fn removal_range(source: &str, Range { start, end }: Range<usize>) -> Range<usize> {
    let bytes = source.as_bytes();
    let skip_blanks = |mut at: usize| {
        while at < bytes.len() && matches!(bytes[at], b' ' | b'\t') {
            at += 1;
        }
        at
    };

    let mut cursor = skip_blanks(end);
    let had_comma = bytes.get(cursor) == Some(&b',');
    if had_comma {
        cursor = skip_blanks(cursor + 1);
    }

    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let alone_before = source[line_start..start].trim().is_empty();
    let rest = &source[cursor..];
    let line_end = if rest.starts_with("//") {
        Some(rest.find('\n').map_or(source.len(), |i| cursor + i))
    } else if rest.starts_with("\r\n") || rest.starts_with('\n') || rest.is_empty() {
        Some(cursor)
    } else {
        None
    };

    match (alone_before, line_end) {
        (true, Some(eol_at)) => {
            let after = match &source[eol_at..] {
                r if r.starts_with("\r\n") => eol_at + 2,
                r if r.starts_with('\n') => eol_at + 1,
                _ => eol_at,
            };
            line_start..after
        }
        _ if had_comma => start..cursor,
        _ => {
            // 最後のプロパティ: 手前のカンマごと消す
            let prefix = source[..start].trim_end();
            if prefix.ends_with(',') {
                prefix.len() - 1..end
            } else {
                start..end
            }
        }
    }
}

/// 計画順に import 文を作る。同じ識別子が既に import されているもの、計画内で重複するものは除く
fn missing_imports(table: &RouteTable, plans: &[PagePlan], alias: &str) -> Vec<String> {
    let mut queued = HashSet::new();
    let mut lines = Vec::new();
    for plan in plans {
        if table.import_of(&plan.identifier).is_some() {
            continue;
        }
        if !queued.insert(plan.identifier.as_str()) {
            continue;
        }
        lines.push(format!(
            "import {} from '{}'",
            plan.identifier,
            plan.page.import_source(alias)
        ));
    }
    lines
}

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> Result<String, RewriteError> {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    for edit in &edits {
        let Range { start, end } = edit.range.clone();
        if start > end
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
        {
            return Err(RewriteError::OutOfBounds(edit.range.clone()));
        }
    }
    for pair in edits.windows(2) {
        if pair[1].range.start < pair[0].range.end {
            return Err(RewriteError::OverlappingEdits {
                first: pair[0].range.clone(),
                second: pair[1].range.clone(),
            });
        }
    }

    let mut text = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        text.push_str(&source[cursor..edit.range.start]);
        text.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    text.push_str(&source[cursor..]);
    Ok(text)
}
