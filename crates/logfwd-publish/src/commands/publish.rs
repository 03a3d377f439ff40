//! logfwd-publish publish コマンドハンドラ

use colored::Colorize;
use logfwd_publish_build::{DryRunRunner, ProcessRunner, PublishReport, Publisher};
use logfwd_publish_config::PublishConfig;
use std::sync::Arc;

pub async fn handle(config: PublishConfig, dry_run: bool, json: bool) -> anyhow::Result<()> {
    tracing::debug!("Publish config: {:?}", config);

    // JSON 出力時は stdout に結果だけを書く
    if json {
        let report = if dry_run {
            Publisher::new(config, Arc::new(DryRunRunner::new()))
                .dry_run(true)
                .run()
                .await?
        } else {
            Publisher::new(config, Arc::new(ProcessRunner)).run().await?
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("{}", "logfwd イメージを公開中...".green());
    println!("イメージ: {}", config.image.cyan());
    println!("エンジン: {}", config.engine.cyan());

    if dry_run {
        println!("{}", "(dry-run: コマンドは実行しません)".yellow());

        let runner = Arc::new(DryRunRunner::new());
        let publisher = Publisher::new(config, runner.clone()).dry_run(true);
        let report = publisher.run().await?;

        println!();
        println!("{}", "実行予定のコマンド:".bold());
        for invocation in runner.invocations() {
            println!("  {} {}", "→".blue(), invocation);
        }
        print_report(&report, true);
        return Ok(());
    }

    let report = Publisher::new(config, Arc::new(ProcessRunner)).run().await?;
    print_report(&report, false);
    Ok(())
}

fn print_report(report: &PublishReport, dry_run: bool) {
    println!();
    println!("タグ: {}", report.tags.to_string().cyan());
    for image in &report.pushed {
        if dry_run {
            println!("  {} {}", "-".dimmed(), image);
        } else {
            println!("  {} {}", "✓".green(), image);
        }
    }
    println!();
    if dry_run {
        println!("{}", "dry-run が完了しました".yellow());
    } else {
        println!(
            "{}",
            format!("✓ {} 個のタグをプッシュしました", report.pushed.len()).green()
        );
    }
}
