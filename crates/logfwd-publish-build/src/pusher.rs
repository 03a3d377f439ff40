//! イメージプッシュ処理
//!
//! ローカルでビルドしたイメージにレジストリ向けのタグを付け、順番にプッシュします。
//! 途中で失敗した場合はそこで止まり、プッシュ済みのタグは取り消しません。

use crate::builder::local_reference;
use crate::engine::Engine;
use crate::error::{BuildError, BuildResult};

/// イメージプッシュを実行するハンドラ
pub struct ImagePusher {
    engine: Engine,
}

impl ImagePusher {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// `<image>:local` に `tag` を付けてプッシュ
    ///
    /// # Returns
    /// プッシュ成功時は完全なイメージ名を返す
    pub async fn push(&self, image: &str, tag: &str) -> BuildResult<String> {
        validate_tag(tag)?;

        let full_image = format!("{}:{}", image, tag);
        tracing::info!("Pushing {}", tag);

        self.engine
            .exec(self.engine.command([
                "tag".to_string(),
                local_reference(image),
                full_image.clone(),
            ]))
            .await?;

        self.engine
            .exec(self.engine.command(["push", full_image.as_str()]))
            .await?;

        Ok(full_image)
    }

    /// タグを順番にプッシュ
    pub async fn push_all<'a, I>(&self, image: &str, tags: I) -> BuildResult<Vec<String>>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut pushed = Vec::new();
        for tag in tags {
            pushed.push(self.push(image, tag).await?);
        }
        Ok(pushed)
    }
}

/// レジストリが受け付けるタグの最大長
const MAX_TAG_LEN: usize = 128;

/// `tag` コマンドに渡す前にタグを検査する
///
/// ブランチ名から作ったタグは文字こそ置換済みだが、`_wip` → `-wip` のように
/// 先頭が `-` になったり、長いブランチ名がそのまま残ったりする。
pub fn validate_tag(tag: &str) -> BuildResult<()> {
    let reason = if tag.is_empty() {
        "must not be empty"
    } else if tag.len() > MAX_TAG_LEN {
        "must be at most 128 characters"
    } else if tag.starts_with(['.', '-']) {
        "must not start with '.' or '-'"
    } else if !tag.chars().all(is_tag_char) {
        "may only contain letters, digits, '.', '-' and '_'"
    } else {
        return Ok(());
    };

    Err(BuildError::InvalidTag {
        tag: tag.to_string(),
        reason,
    })
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}
