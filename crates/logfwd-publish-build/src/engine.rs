use crate::error::{BuildError, BuildResult};
use crate::runner::{CommandOutput, CommandRunner, Invocation};
use std::fmt;
use std::sync::Arc;

/// コンテナエンジン CLI（`docker` 互換）へのハンドル
///
/// クローンしてビルダー・認証・プッシャーで共有する。
#[derive(Clone)]
pub struct Engine {
    runner: Arc<dyn CommandRunner>,
    program: String,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(runner: Arc<dyn CommandRunner>, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// エンジンのサブコマンド呼び出しを組み立てる
    pub fn command<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(self.program.as_str()).args(args)
    }

    /// コマンドを実行し、非ゼロ終了をエラーにする
    pub async fn exec(&self, invocation: Invocation) -> BuildResult<CommandOutput> {
        let command = invocation.to_string();
        tracing::debug!("Running: {}", command);

        let output = self
            .runner
            .run(&invocation)
            .await
            .map_err(|source| BuildError::Spawn {
                command: command.clone(),
                source,
            })?;

        for line in output.stdout.lines() {
            tracing::debug!("  {}", line);
        }

        if !output.success() {
            return Err(BuildError::CommandFailed {
                command,
                code: output.code,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}
