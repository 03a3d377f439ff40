//! レジストリ認証処理
//!
//! `<engine> login --password-stdin` でエンジンの認証情報ストアにログインします。
//! パスワードはコマンドライン引数やログに出さず、標準入力でのみ渡します。

use crate::engine::Engine;
use crate::error::{BuildError, BuildResult};
use logfwd_publish_config::Credentials;

/// レジストリ名を持たないイメージのデフォルト
pub const DOCKER_HUB: &str = "docker.io";

pub struct RegistryAuth {
    engine: Engine,
}

impl RegistryAuth {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// イメージのレジストリにログイン
    ///
    /// Docker Hub の場合はサーバー名を省略し、エンジンのデフォルトに任せる。
    pub async fn login(&self, image: &str, credentials: Option<&Credentials>) -> BuildResult<()> {
        let credentials = credentials.ok_or(BuildError::MissingCredentials)?;
        let registry = extract_registry(image);

        tracing::info!("Authentication...");

        let mut invocation = self.engine.command([
            "login",
            "-u",
            credentials.username.as_str(),
            "--password-stdin",
        ]);
        if registry != DOCKER_HUB {
            invocation = invocation.arg(registry.as_str());
        }
        invocation = invocation.stdin(format!("{}\n", credentials.password));

        self.engine.exec(invocation).await?;

        tracing::debug!("Authentication... DONE ({})", registry);
        Ok(())
    }
}

/// イメージ名からレジストリを抽出
///
/// # Examples
/// - `ghcr.io/org/app:tag` -> `ghcr.io`
/// - `habx/logfwd` -> `docker.io`
/// - `localhost:5000/app` -> `localhost:5000`
pub fn extract_registry(image: &str) -> String {
    if let Some((first, _)) = image.split_once('/') {
        // `.` か `:` を含む最初の要素はレジストリ（ホスト名・ポート）
        if first.contains('.') || first.contains(':') || first == "localhost" {
            return first.to_string();
        }
    }

    DOCKER_HUB.to_string()
}
