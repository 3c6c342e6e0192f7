//! 宣言的なルート定義ファイルからページの雛形を生成し、
//! ルート定義ファイル自体を import / コンポーネント参照つきに書き換えるツール。
//!
//! 処理の流れ: [`parser`] → [`resolver`] → [`rewriter`] (テキスト作成) →
//! [`scaffold`] (ページ書き出し) → ルートファイルの書き戻し。
//! 全体の組み立ては [`generate::generate_routes`]。

pub mod config;
pub mod error;
pub mod generate;
pub mod ident;
pub mod init;
pub mod literal;
pub mod model;
pub mod parser;
pub mod resolver;
pub mod rewriter;
pub mod scaffold;

pub use config::{Overrides, ProjectConfig};
pub use error::{ConfigError, GenerateError, InitError, ParseError, RewriteError, ScaffoldIoError};
pub use generate::{generate_routes, GenerateReport};
pub use ident::derive_identifier;
pub use model::{RouteEntry, RouteTable};
pub use parser::{parse_route_table, Dialect};
