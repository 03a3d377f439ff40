//! logfwd-publish の設定
//!
//! CI 環境変数・レジストリ認証情報・公開先イメージの設定を起動時に一度だけ解決し、
//! 値としてパイプラインに渡します。これより下の層は環境変数を直接読みません。

pub mod error;

pub use error::*;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// リリースタグ（`vMAJOR.MINOR.PATCH`）を渡す CI 変数
pub const ENV_CIRCLE_TAG: &str = "CIRCLE_TAG";
/// ブランチ名を渡す CI 変数
pub const ENV_CIRCLE_BRANCH: &str = "CIRCLE_BRANCH";
pub const ENV_AUTH_USER: &str = "DOCKER_AUTH_USER";
pub const ENV_AUTH_PASS: &str = "DOCKER_AUTH_PASS";

pub const DEFAULT_IMAGE: &str = "habx/logfwd";
pub const DEFAULT_ENGINE: &str = "docker";
pub const DEFAULT_ARTIFACT_NAME: &str = "logfwd";
/// 前段のパイプラインがアーティファクトを置くパス
pub const DEFAULT_ARTIFACT_SOURCE: &str = "/tmp/workspace/logfwd";

/// 環境変数を読む。空文字列は未設定として扱う
fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// タグ導出に使う CI 環境
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CiEnv {
    /// リリースタグ（例: `v1.2.3`）
    pub tag: Option<String>,
    /// ブランチ名（例: `feature/foo`）
    pub branch: Option<String>,
}

impl CiEnv {
    pub fn new(tag: Option<String>, branch: Option<String>) -> Self {
        Self {
            tag: non_empty(tag),
            branch: non_empty(branch),
        }
    }

    /// `CIRCLE_TAG` / `CIRCLE_BRANCH` から読み込む
    pub fn from_env() -> Self {
        let env = Self {
            tag: non_empty_var(ENV_CIRCLE_TAG),
            branch: non_empty_var(ENV_CIRCLE_BRANCH),
        };
        tracing::debug!("CI environment: {:?}", env);
        env
    }

    /// CLI で明示された値で上書き
    pub fn with_overrides(self, tag: Option<String>, branch: Option<String>) -> Self {
        Self {
            tag: non_empty(tag).or(self.tag),
            branch: non_empty(branch).or(self.branch),
        }
    }
}

/// レジストリの認証情報
///
/// パスワードは `Debug` に出力されません。
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `DOCKER_AUTH_USER` / `DOCKER_AUTH_PASS` から読み込む
    ///
    /// どちらかが未設定なら `None`。
    pub fn from_env() -> Option<Self> {
        let username = non_empty_var(ENV_AUTH_USER)?;
        let password = non_empty_var(ENV_AUTH_PASS)?;
        Some(Self { username, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// ビルドに同梱するアーティファクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    /// ビルドコンテキスト内でのファイル名
    pub name: String,
    /// コンテキストに無い場合のコピー元
    pub source: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ARTIFACT_NAME.to_string(),
            source: PathBuf::from(DEFAULT_ARTIFACT_SOURCE),
        }
    }
}

/// 公開処理全体の設定
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// タグなしのイメージ名（例: `habx/logfwd`, `ghcr.io/org/app`）
    pub image: String,
    /// コンテナエンジンのコマンド（`docker`, `podman` など）
    pub engine: String,
    /// ビルドコンテキスト
    pub context: PathBuf,
    pub artifact: ArtifactConfig,
    pub ci: CiEnv,
    pub credentials: Option<Credentials>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            context: PathBuf::from("."),
            artifact: ArtifactConfig::default(),
            ci: CiEnv::default(),
            credentials: None,
        }
    }
}

impl PublishConfig {
    /// プロセス環境から CI 変数と認証情報を読み込んだ設定を作る
    pub fn from_env() -> Self {
        Self {
            ci: CiEnv::from_env(),
            credentials: Credentials::from_env(),
            ..Self::default()
        }
    }

    /// 設定値の整合性を確認
    pub fn validate(&self) -> Result<()> {
        validate_image_name(&self.image)?;

        if self.engine.trim().is_empty() {
            return Err(ConfigError::EngineNotSet);
        }

        let name = Path::new(&self.artifact.name);
        if self.artifact.name.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(ConfigError::InvalidArtifactName(self.artifact.name.clone()));
        }

        Ok(())
    }
}

/// イメージ名を検証
///
/// タグやダイジェストは後から付与するため、名前に含まれていてはいけない。
/// `localhost:5000/app` のようなレジストリのポート指定は許可する。
fn validate_image_name(image: &str) -> Result<()> {
    if image.is_empty() || image.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidImage(image.to_string()));
    }

    let last = image.rsplit('/').next().unwrap_or(image);
    if last.is_empty() || last.contains(':') || image.contains('@') {
        return Err(ConfigError::InvalidImage(image.to_string()));
    }

    Ok(())
}
