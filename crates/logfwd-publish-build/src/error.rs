use logfwd_publish_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("`{command}` exited with {}", describe_code(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Registry credentials are not set")]
    MissingCredentials,

    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl BuildError {
    /// プロセスの終了コード
    ///
    /// 外部コマンドの失敗はそのコマンドの終了コードをそのまま返す。
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                format!("{}\n\n{}", self, stderr.trim_end())
            }
            BuildError::ArtifactMissing(path) => {
                format!(
                    "アーティファクトが見つかりません: {}\n\
                     \n\
                     前段のジョブで workspace に logfwd バイナリを保存しているか確認してください。\n\
                     別の場所にある場合は --artifact-source で指定できます。",
                    path.display()
                )
            }
            BuildError::MissingCredentials => {
                format!(
                    "{}\n\
                     \n\
                     DOCKER_AUTH_USER と DOCKER_AUTH_PASS を設定してください。",
                    self
                )
            }
            BuildError::InvalidTag { .. } => {
                format!(
                    "{}\n\
                     \n\
                     ブランチ名から作ったタグの場合は --branch で別の名前を指定できます。",
                    self
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
