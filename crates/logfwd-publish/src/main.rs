mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use logfwd_publish_build::BuildError;
use logfwd_publish_config::{
    ArtifactConfig, CiEnv, DEFAULT_ARTIFACT_NAME, DEFAULT_ARTIFACT_SOURCE,
    DEFAULT_ENGINE, DEFAULT_IMAGE, PublishConfig,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "logfwd-publish")]
#[command(about = "logfwd のコンテナイメージをビルドし、CI から導出したタグでプッシュする", long_about = None)]
struct Cli {
    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージをビルドしてレジストリにプッシュ
    Publish {
        #[command(flatten)]
        ci: CiArgs,
        /// イメージ名（タグなし）
        #[arg(long, env = "LOGFWD_IMAGE", default_value = DEFAULT_IMAGE)]
        image: String,
        /// コンテナエンジンのコマンド
        #[arg(long, env = "LOGFWD_ENGINE", default_value = DEFAULT_ENGINE)]
        engine: String,
        /// ビルドコンテキスト
        #[arg(long, default_value = ".")]
        context: PathBuf,
        /// コンテキストに置くアーティファクトのファイル名
        #[arg(long, default_value = DEFAULT_ARTIFACT_NAME)]
        artifact: String,
        /// アーティファクトが無い場合のコピー元
        #[arg(long, env = "LOGFWD_ARTIFACT_SOURCE", default_value = DEFAULT_ARTIFACT_SOURCE)]
        artifact_source: PathBuf,
        /// コマンドを実行せずに表示のみ行う
        #[arg(long)]
        dry_run: bool,
        /// 結果を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 導出されるタグを表示（コマンドは実行しない）
    Tags {
        #[command(flatten)]
        ci: CiArgs,
        /// JSON 配列で出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

/// CI 変数の上書き
#[derive(Args)]
struct CiArgs {
    /// リリースタグ（CIRCLE_TAG より優先）
    #[arg(long)]
    tag: Option<String>,
    /// ブランチ名（CIRCLE_BRANCH より優先）
    #[arg(long)]
    branch: Option<String>,
}

impl CiArgs {
    fn resolve(self) -> CiEnv {
        CiEnv::from_env().with_overrides(self.tag, self.branch)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout はタグ一覧などの出力に使うので、ログは stderr へ
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command).await {
        std::process::exit(report_error(&err));
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Publish {
            ci,
            image,
            engine,
            context,
            artifact,
            artifact_source,
            dry_run,
            json,
        } => {
            let defaults = PublishConfig::from_env();
            let config = PublishConfig {
                image,
                engine,
                context,
                artifact: ArtifactConfig {
                    name: artifact,
                    source: artifact_source,
                },
                ci: defaults.ci.with_overrides(ci.tag, ci.branch),
                ..defaults
            };
            commands::publish::handle(config, dry_run, json).await?;
        }
        Commands::Tags { ci, json } => {
            commands::tags::handle(&ci.resolve(), json)?;
        }
        Commands::Version => {
            println!("logfwd-publish {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// エラーを表示し、プロセスの終了コードを返す
///
/// 外部コマンドの失敗はそのコマンドの終了コードを引き継ぐ。
fn report_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<BuildError>() {
        Some(build_err) => {
            eprintln!("{} {}", "Error:".red().bold(), build_err.user_message());
            build_err.exit_code()
        }
        None => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            1
        }
    }
}
