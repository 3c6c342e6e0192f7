// src/main.rs

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use route_scaffold::config::{Overrides, ProjectConfig};
use route_scaffold::error::GenerateError;
use route_scaffold::generate::generate_routes;
use route_scaffold::init::init_project;
use route_scaffold::parser::{parse_route_table, Dialect};

/// CLI 引数定義
#[derive(Parser, Debug)]
#[command(
    name = "route-scaffold",
    version,
    about = "ルート定義ファイルからページの雛形を生成し、ルート定義を書き換える CLI ツール"
)]
struct Cli {
    /// 対象プロジェクトのルート (package.json のあるディレクトリ)
    /// 例: `--project-root C:/path/to/my-vue-project`
    #[arg(short = 'r', long = "project-root", value_name = "DIR", default_value = ".", global = true)]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// ルート定義からページを生成し、ルート定義ファイルを書き換える
    Router {
        /// ルート定義ファイル (package.json の `routes` より優先)
        #[arg(long, value_name = "FILE")]
        routes: Option<String>,

        /// テンプレートディレクトリ (package.json の `template` より優先)
        #[arg(long, value_name = "DIR")]
        template: Option<String>,
    },
    /// プロジェクトテンプレートから新しいプロジェクトを作る
    Init {
        /// 作成するディレクトリ名 (英語名)
        name: String,

        /// 表示名 (PROJECTNAME の置換先)。省略時はディレクトリ名
        #[arg(long)]
        title: Option<String>,

        /// プロジェクトテンプレートのディレクトリ
        #[arg(long, value_name = "DIR")]
        template: PathBuf,

        /// 既存のディレクトリがあっても上書きする
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// ルート定義ファイルを解析して JSON で出力する (書き込みはしない)
    Inspect {
        #[arg(long, value_name = "FILE")]
        routes: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    // 1) CLI 引数をパースし、プロジェクトルートを絶対パス化
    let cli = Cli::parse();
    let project_dir = cli
        .project_root
        .canonicalize()
        .with_context(|| format!("プロジェクトルート {:?} が見つかりません", cli.project_root))?;

    match cli.command {
        Commands::Router { routes, template } => {
            run_router(&project_dir, Overrides { routes, template });
            Ok(())
        }
        Commands::Init {
            name,
            title,
            template,
            force,
        } => {
            let target = project_dir.join(&name);
            let title = title.unwrap_or_else(|| name.clone());
            let created = init_project(&template, &target, &title, force)?;
            println!("プロジェクト作成完了: {:?} ({} ファイル)", target, created.len());
            Ok(())
        }
        Commands::Inspect { routes } => {
            let overrides = Overrides {
                routes,
                template: None,
            };
            let config = ProjectConfig::load(&project_dir, &overrides)?;
            let src = fs::read_to_string(&config.routes_file)
                .with_context(|| format!("{:?} を読み込めません", config.routes_file))?;
            let table = parse_route_table(&src, Dialect::from_path(&config.routes_file))?;
            println!("{}", serde_json::to_string_pretty(&table)?);
            Ok(())
        }
    }
}

/// `router` コマンド。失敗時は段階ごとの終了コードでプロセスを終える
fn run_router(project_dir: &Path, overrides: Overrides) {
    let result = ProjectConfig::load(project_dir, &overrides)
        .map_err(GenerateError::from)
        .and_then(|config| generate_routes(&config));

    match result {
        Ok(report) if report.is_noop() => println!("No need to update."),
        Ok(report) => println!(
            "ルート生成完了: {} ファイル作成, {} ファイルスキップ, import {} 件追加",
            report.files.written.len(),
            report.files.skipped.len(),
            report.imports_added.len()
        ),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
