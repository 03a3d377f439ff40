//! ビルドアーティファクトの配置
//!
//! イメージに同梱するバイナリがビルドコンテキストに無ければ、前段のジョブが
//! 保存した場所からコピーします。

use crate::error::{BuildError, BuildResult};
use logfwd_publish_config::ArtifactConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// すでにコンテキストに存在する
    Present(PathBuf),
    /// コピーが必要
    Missing { source: PathBuf, dest: PathBuf },
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// アーティファクトの状態を確認（ファイル操作はしない）
pub async fn artifact_status(dir: &Path, artifact: &ArtifactConfig) -> ArtifactStatus {
    let dest = dir.join(&artifact.name);
    if is_file(&dest).await {
        ArtifactStatus::Present(dest)
    } else {
        ArtifactStatus::Missing {
            source: artifact.source.clone(),
            dest,
        }
    }
}

/// アーティファクトをコンテキストに配置
///
/// 配置先のパスを返す。
pub async fn ensure_artifact(dir: &Path, artifact: &ArtifactConfig) -> BuildResult<PathBuf> {
    match artifact_status(dir, artifact).await {
        ArtifactStatus::Present(dest) => {
            tracing::debug!("Artifact already present: {}", dest.display());
            Ok(dest)
        }
        ArtifactStatus::Missing { source, dest } => {
            if !is_file(&source).await {
                return Err(BuildError::ArtifactMissing(source));
            }
            tracing::info!("Copying {} to {}", source.display(), dest.display());
            tokio::fs::copy(&source, &dest).await?;
            Ok(dest)
        }
    }
}
