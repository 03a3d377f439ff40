use crate::engine::Engine;
use crate::error::BuildResult;
use std::path::Path;

/// ビルド時に付けるローカルタグ
pub const LOCAL_TAG: &str = "local";

pub struct ImageBuilder {
    engine: Engine,
}

impl ImageBuilder {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// イメージをビルドし、`<image>:local` として登録する
    ///
    /// 成功時はローカル参照を返す。
    pub async fn build_image(&self, context: &Path, image: &str) -> BuildResult<String> {
        let local = local_reference(image);
        tracing::info!("Building image: {}", local);

        let invocation = self.engine.command([
            "build".to_string(),
            context.to_string_lossy().to_string(),
            "-t".to_string(),
            local.clone(),
        ]);
        self.engine.exec(invocation).await?;

        tracing::info!("Successfully built: {}", local);
        Ok(local)
    }
}

pub fn local_reference(image: &str) -> String {
    format!("{}:{}", image, LOCAL_TAG)
}
