// src/literal.rs
//! ルートエントリのフィールド値を「データ」として評価する制限付き評価器
//!
//! 受け付けるのは文字列・真偽値・数値・null・裸の識別子と、それらの配列／オブジェクトだけ。
//! 関数呼び出しや JSX など実行を伴う式はすべて拒否する。

use swc_common::{Span, Spanned};
use swc_ecma_ast::*;

/// 評価結果
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// `loginPath` や `Kanban` のような裸の識別子
    Ident(String),
    Array(Vec<LiteralValue>),
    Object(Vec<(String, LiteralValue)>),
}

impl LiteralValue {
    /// エラーメッセージ用の種別名
    pub fn kind_name(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Bool(_) => "真偽値",
            LiteralValue::Number(_) => "数値",
            LiteralValue::Str(_) => "文字列",
            LiteralValue::Ident(_) => "識別子",
            LiteralValue::Array(_) => "配列",
            LiteralValue::Object(_) => "オブジェクト",
        }
    }
}

/// 評価を拒否した式
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub construct: &'static str,
    pub span: Span,
}

/// 式をリテラルとして評価する
pub fn evaluate(expr: &Expr) -> Result<LiteralValue, Rejected> {
    match expr {
        Expr::Lit(lit) => evaluate_lit(lit),
        Expr::Ident(ident) => Ok(LiteralValue::Ident(ident.sym.to_string())),

        // 型だけの包みは中身を見る
        Expr::Paren(ParenExpr { expr, .. })
        | Expr::TsAs(TsAsExpr { expr, .. })
        | Expr::TsConstAssertion(TsConstAssertion { expr, .. }) => evaluate(expr),

        Expr::Unary(UnaryExpr {
            op: UnaryOp::Minus,
            arg,
            span,
        }) => match &**arg {
            Expr::Lit(Lit::Num(Number { value, .. })) => Ok(LiteralValue::Number(-value)),
            _ => Err(reject("単項演算", *span)),
        },

        // 置換を含まないテンプレート文字列は普通の文字列と同じ
        Expr::Tpl(Tpl {
            exprs,
            quasis,
            span,
        }) => match (exprs.is_empty(), quasis.as_slice()) {
            (true, [only]) => Ok(LiteralValue::Str(
                only.cooked
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| only.raw.to_string()),
            )),
            _ => Err(reject("テンプレートリテラル", *span)),
        },

        Expr::Array(ArrayLit { elems, span }) => {
            let mut values = Vec::with_capacity(elems.len());
            for elem in elems {
                match elem {
                    Some(ExprOrSpread { spread: None, expr }) => values.push(evaluate(expr)?),
                    Some(ExprOrSpread { spread: Some(_), .. }) => {
                        return Err(reject("スプレッド構文", *span));
                    }
                    None => return Err(reject("配列の空要素", *span)),
                }
            }
            Ok(LiteralValue::Array(values))
        }

        Expr::Object(obj) => evaluate_object(obj),

        other => Err(reject(construct_name(other), other.span())),
    }
}

fn evaluate_lit(lit: &Lit) -> Result<LiteralValue, Rejected> {
    match lit {
        Lit::Str(Str { value, .. }) => Ok(LiteralValue::Str(value.to_string())),
        Lit::Bool(Bool { value, .. }) => Ok(LiteralValue::Bool(*value)),
        Lit::Null(_) => Ok(LiteralValue::Null),
        Lit::Num(Number { value, .. }) => Ok(LiteralValue::Number(*value)),
        Lit::BigInt(big) => Err(reject("BigInt", big.span)),
        Lit::Regex(re) => Err(reject("正規表現", re.span)),
        Lit::JSXText(text) => Err(reject("JSX", text.span)),
    }
}

fn evaluate_object(obj: &ObjectLit) -> Result<LiteralValue, Rejected> {
    let mut fields = Vec::with_capacity(obj.props.len());
    for prop in &obj.props {
        let PropOrSpread::Prop(prop) = prop else {
            return Err(reject("スプレッド構文", obj.span));
        };
        match &**prop {
            Prop::KeyValue(KeyValueProp { key, value }) => {
                let Some(name) = prop_name(key) else {
                    return Err(reject("計算されたプロパティ名", key.span()));
                };
                fields.push((name, evaluate(value)?));
            }
            Prop::Shorthand(ident) => {
                let name = ident.sym.to_string();
                fields.push((name.clone(), LiteralValue::Ident(name)));
            }
            other => return Err(reject("メソッド定義", other.span())),
        }
    }
    Ok(LiteralValue::Object(fields))
}

/// プロパティのキー名 (識別子・文字列・数値)。計算キーは None
pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        PropName::Computed(_) | PropName::BigInt(_) => None,
    }
}

fn reject(construct: &'static str, span: Span) -> Rejected {
    Rejected { construct, span }
}

fn construct_name(expr: &Expr) -> &'static str {
    match expr {
        Expr::Call(_) => "関数呼び出し",
        Expr::New(_) => "new 式",
        Expr::Arrow(_) => "アロー関数",
        Expr::Fn(_) => "関数式",
        Expr::Class(_) => "クラス式",
        Expr::JSXElement(_) | Expr::JSXFragment(_) | Expr::JSXEmpty(_) => "JSX",
        Expr::Member(_) | Expr::SuperProp(_) | Expr::OptChain(_) => "メンバーアクセス",
        Expr::Bin(_) => "二項演算",
        Expr::Assign(_) | Expr::Update(_) => "代入",
        Expr::Cond(_) => "条件演算",
        Expr::TaggedTpl(_) => "タグ付きテンプレート",
        Expr::Await(_) | Expr::Yield(_) => "await / yield",
        Expr::Seq(_) => "カンマ演算",
        _ => "式",
    }
}
