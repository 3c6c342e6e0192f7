use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_parser::{error::Error as SwcError, lexer::Lexer, Parser as SwcParser, StringInput, Syntax, TsConfig};
use swc_ecma_visit::{Visit, VisitWith};

use std::ops::Range;
use std::path::Path;

use crate::error::ParseError;
use crate::literal::{self, LiteralValue};
use crate::model::{ComponentRef, Directive, DirectiveSpan, ImportLine, RouteEntry, RouteTable};

/// ルートファイルの方言
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Ts,
    Tsx,
}

impl Dialect {
    /// 拡張子から判定する (.tsx / .jsx なら JSX を有効にする)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::Ts,
        }
    }
}

/// swc の BytePos をソーステキスト上のバイト位置に変換する
struct Locator<'a> {
    source: &'a str,
    start: BytePos,
}

impl Locator<'_> {
    fn offset(&self, pos: BytePos) -> usize {
        (pos.0.saturating_sub(self.start.0) as usize).min(self.source.len())
    }

    fn range(&self, span: Span) -> Range<usize> {
        self.offset(span.lo)..self.offset(span.hi)
    }

    /// 1 始まりの (行, 列) と、その行のテキスト
    fn position(&self, offset: usize) -> (usize, usize, String) {
        let offset = offset.min(self.source.len());
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = self.source[offset..]
            .find('\n')
            .map_or(self.source.len(), |i| offset + i);
        let line = self.source[..offset].matches('\n').count() + 1;
        let column = self.source[line_start..offset].chars().count() + 1;
        let snippet = self.source[line_start..line_end].trim_end().to_string();
        (line, column, snippet)
    }

    fn syntax_error(&self, err: &SwcError) -> ParseError {
        let (line, column, snippet) = self.position(self.offset(err.span().lo));
        ParseError::Syntax {
            line,
            column,
            message: format!("{:?}", err.kind()),
            snippet,
        }
    }

    fn invalid_field(&self, field: &str, span: Span, reason: String) -> ParseError {
        let (line, column, snippet) = self.position(self.offset(span.lo));
        ParseError::InvalidField {
            field: field.to_string(),
            line,
            column,
            reason,
            snippet,
        }
    }
}

/// AST をトラバースしてルート配列と import 宣言を集める Visitor
struct RouteVisitor<'a> {
    locator: &'a Locator<'a>,
    /// 見つかったルート配列 (変数名, 配列リテラル)
    route_array: Option<(String, ArrayLit)>,
    imports: Vec<ImportLine>,
    /// 関数・クラスの内側にいる深さ。0 のときだけモジュールレベル
    scope_depth: usize,
}

impl<'a> RouteVisitor<'a> {
    fn new(locator: &'a Locator<'a>) -> Self {
        RouteVisitor {
            locator,
            route_array: None,
            imports: Vec::new(),
            scope_depth: 0,
        }
    }

    /// ObjectLit (例: `{ name: '看板', component: '/kanban', table: true }`) を受け取り
    /// RouteEntry を構築して返す
    fn parse_route_object(&self, obj_lit: &ObjectLit) -> Result<RouteEntry, ParseError> {
        let mut entry = RouteEntry {
            name: None,
            path: None,
            component: None,
            table: false,
            service: false,
            cover: None,
            children: Vec::new(),
            span: self.locator.range(obj_lit.span),
            directives: Vec::new(),
        };
        // name が文字列以外だった場合の位置 (component が文字列ならエラーにする)
        let mut opaque_name: Option<Span> = None;

        for prop in &obj_lit.props {
            let PropOrSpread::Prop(boxed_prop) = prop else {
                continue;
            };
            match &**boxed_prop {
                Prop::KeyValue(KeyValueProp { key, value }) => {
                    let Some(key_name) = literal::prop_name(key) else {
                        continue;
                    };
                    match key_name.as_str() {
                        "name" => match literal::evaluate(value) {
                            Ok(LiteralValue::Str(s)) => entry.name = Some(s),
                            _ => opaque_name = Some(value.span()),
                        },
                        "path" => {
                            if let Ok(LiteralValue::Str(s)) = literal::evaluate(value) {
                                entry.path = Some(s);
                            }
                        }
                        "component" => {
                            entry.component = Some(self.parse_component(value));
                        }
                        "children" | "routes" => {
                            if let Expr::Array(arr_lit) = &**value {
                                entry.children.extend(self.extract_routes_from_array(arr_lit)?);
                            } else {
                                tracing::debug!(key = %key_name, "配列以外の子ルートは無視します");
                            }
                        }
                        other => {
                            if let Some(directive) = Directive::from_key(other) {
                                let flag = self.parse_directive(directive, value)?;
                                match directive {
                                    Directive::Table => entry.table = flag,
                                    Directive::Service => entry.service = flag,
                                    Directive::Cover => entry.cover = Some(flag),
                                }
                                entry.directives.push(DirectiveSpan {
                                    directive,
                                    span: self.locator.offset(key.span().lo)
                                        ..self.locator.offset(value.span().hi),
                                });
                            }
                        }
                    }
                }
                // `component,` のような省略記法は import 済みの識別子とみなす
                Prop::Shorthand(ident) if &*ident.sym == "component" => {
                    entry.component = Some(ComponentRef::Bound {
                        ident: ident.sym.to_string(),
                        span: self.locator.range(ident.span),
                    });
                }
                _ => {}
            }
        }

        if let (Some(span), Some(ComponentRef::Path { .. })) = (opaque_name, &entry.component) {
            return Err(self.locator.invalid_field(
                "name",
                span,
                "component を生成する場合、name は文字列リテラルである必要があります".to_string(),
            ));
        }

        Ok(entry)
    }

    fn parse_component(&self, value: &Expr) -> ComponentRef {
        match literal::evaluate(value) {
            Ok(LiteralValue::Str(s)) => ComponentRef::Path {
                value: s,
                span: self.locator.range(value.span()),
            },
            Ok(LiteralValue::Ident(ident)) => ComponentRef::Bound {
                ident,
                span: self.locator.range(value.span()),
            },
            _ => ComponentRef::Inline,
        }
    }

    fn parse_directive(&self, directive: Directive, value: &Expr) -> Result<bool, ParseError> {
        match literal::evaluate(value) {
            Ok(LiteralValue::Bool(flag)) => Ok(flag),
            Ok(other) => Err(self.locator.invalid_field(
                directive.key(),
                value.span(),
                format!("真偽値リテラルが必要ですが {} でした", other.kind_name()),
            )),
            Err(rejected) => Err(self.locator.invalid_field(
                directive.key(),
                rejected.span,
                format!("{} は評価できません", rejected.construct),
            )),
        }
    }

    /// 配列からルート情報を抽出する
    fn extract_routes_from_array(&self, arr_lit: &ArrayLit) -> Result<Vec<RouteEntry>, ParseError> {
        let mut routes = Vec::new();
        for elem in arr_lit.elems.iter().flatten() {
            match (&elem.spread, &*elem.expr) {
                (None, Expr::Object(obj_lit)) => routes.push(self.parse_route_object(obj_lit)?),
                _ => {
                    let at = self.locator.offset(elem.expr.span().lo);
                    tracing::debug!(offset = at, "オブジェクト以外のルート要素をスキップします");
                }
            }
        }
        Ok(routes)
    }
}

impl Visit for RouteVisitor<'_> {
    fn visit_import_decl(&mut self, import: &ImportDecl) {
        let locals = import
            .specifiers
            .iter()
            .map(|spec| match spec {
                ImportSpecifier::Default(ImportDefaultSpecifier { local, .. })
                | ImportSpecifier::Named(ImportNamedSpecifier { local, .. })
                | ImportSpecifier::Namespace(ImportStarAsSpecifier { local, .. }) => {
                    local.sym.to_string()
                }
            })
            .collect();
        self.imports.push(ImportLine {
            locals,
            source: import.src.value.to_string(),
            span: self.locator.range(import.span),
        });
    }

    /// `const routes: RouteProps[] = [...]` のように配列型注釈つきで配列リテラルを
    /// 代入している最初のモジュールレベル変数をルート配列とみなす
    fn visit_var_decl(&mut self, var_decl: &VarDecl) {
        if self.scope_depth == 0 && self.route_array.is_none() {
            for declarator in &var_decl.decls {
                let Pat::Ident(BindingIdent {
                    id,
                    type_ann: Some(type_ann),
                }) = &declarator.name
                else {
                    continue;
                };
                if !matches!(&*type_ann.type_ann, TsType::TsArrayType(_)) {
                    continue;
                }
                if let Some(init_expr) = &declarator.init {
                    if let Expr::Array(arr_lit) = &**init_expr {
                        tracing::debug!(
                            binding = %id.sym,
                            elements = arr_lit.elems.len(),
                            "ルート配列を発見"
                        );
                        self.route_array = Some((id.sym.to_string(), arr_lit.clone()));
                        break;
                    }
                }
            }
        }

        // 子ノードも訪問
        var_decl.visit_children_with(self);
    }

    fn visit_function(&mut self, function: &Function) {
        self.scope_depth += 1;
        function.visit_children_with(self);
        self.scope_depth -= 1;
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.scope_depth += 1;
        arrow.visit_children_with(self);
        self.scope_depth -= 1;
    }

    fn visit_class(&mut self, class: &Class) {
        self.scope_depth += 1;
        class.visit_children_with(self);
        self.scope_depth -= 1;
    }
}

/// ルートファイルのテキストを解析して RouteTable を返す
pub fn parse_route_table(source: &str, dialect: Dialect) -> Result<RouteTable, ParseError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon, source.to_string());
    let locator = Locator {
        source,
        start: fm.start_pos,
    };

    // TypeScript構文でパースする設定
    let syntax = Syntax::Typescript(TsConfig {
        tsx: dialect == Dialect::Tsx,
        decorators: true,
        dts: false,
        no_early_errors: true,
        disallow_ambiguous_jsx_like: false,
    });

    let lexer = Lexer::new(
        syntax,
        Default::default(), // es version
        StringInput::from(&*fm),
        None,
    );

    let mut parser = SwcParser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| locator.syntax_error(&e))?;
    // 回復できた構文エラーも受け付けない
    if let Some(e) = parser.take_errors().first() {
        return Err(locator.syntax_error(e));
    }

    let mut visitor = RouteVisitor::new(&locator);
    visitor.visit_module(&module);

    let Some((binding, arr_lit)) = visitor.route_array.take() else {
        return Err(ParseError::MissingRouteArray);
    };
    let entries = visitor.extract_routes_from_array(&arr_lit)?;

    let import_anchor = visitor.imports.last().map(|import| {
        let end = import.span.end;
        source[end..].find('\n').map_or(source.len(), |i| end + i)
    });
    // `\r\n` の場合は `\r` の手前を行末とする
    let import_anchor = import_anchor.map(|at| {
        if at > 0 && source.as_bytes().get(at - 1) == Some(&b'\r') {
            at - 1
        } else {
            at
        }
    });

    tracing::debug!(
        binding = %binding,
        entries = entries.len(),
        imports = visitor.imports.len(),
        "ルートファイル解析完了"
    );

    Ok(RouteTable {
        binding,
        array_span: locator.range(arr_lit.span),
        entries,
        imports: visitor.imports,
        import_anchor,
    })
}
