//! 公開パイプライン
//!
//! アーティファクト配置 → タグ導出 → ビルド → ログイン → タグ付けとプッシュ
//! の順に一度だけ実行します。どの段階の失敗もその場で処理全体を止めます。

use crate::artifact::{ArtifactStatus, artifact_status, ensure_artifact};
use crate::auth::RegistryAuth;
use crate::builder::ImageBuilder;
use crate::engine::Engine;
use crate::error::BuildResult;
use crate::pusher::ImagePusher;
use crate::runner::CommandRunner;
use crate::tags::{TagList, derive_tags};
use logfwd_publish_config::{CiEnv, PublishConfig};
use serde::Serialize;
use std::sync::Arc;

/// 公開結果（`publish --json` の出力）
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    /// タグ導出に使った CI 環境
    pub ci: CiEnv,
    pub tags: TagList,
    /// プッシュした完全なイメージ名（順序どおり）
    pub pushed: Vec<String>,
}

pub struct Publisher {
    config: PublishConfig,
    engine: Engine,
    dry_run: bool,
}

impl Publisher {
    pub fn new(config: PublishConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let engine = Engine::new(runner, config.engine.clone());
        Self {
            config,
            engine,
            dry_run: false,
        }
    }

    /// アーティファクトをコピーせず、確認だけ行う
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> BuildResult<PublishReport> {
        self.config.validate()?;
        self.stage_artifact().await?;

        let tags = derive_tags(&self.config.ci);
        tracing::info!("Tags: {}", tags);

        ImageBuilder::new(self.engine.clone())
            .build_image(&self.config.context, &self.config.image)
            .await?;

        RegistryAuth::new(self.engine.clone())
            .login(&self.config.image, self.config.credentials.as_ref())
            .await?;

        let pushed = ImagePusher::new(self.engine.clone())
            .push_all(&self.config.image, &tags)
            .await?;

        Ok(PublishReport {
            ci: self.config.ci.clone(),
            tags,
            pushed,
        })
    }

    async fn stage_artifact(&self) -> BuildResult<()> {
        let context = &self.config.context;
        let artifact = &self.config.artifact;

        if !self.dry_run {
            ensure_artifact(context, artifact).await?;
            return Ok(());
        }

        match artifact_status(context, artifact).await {
            ArtifactStatus::Present(path) => {
                tracing::info!("[dry-run] artifact present: {}", path.display());
            }
            ArtifactStatus::Missing { source, dest } => {
                tracing::info!(
                    "[dry-run] would copy {} to {}",
                    source.display(),
                    dest.display()
                );
            }
        }
        Ok(())
    }
}
