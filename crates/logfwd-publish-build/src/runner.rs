//! 外部コマンドの実行
//!
//! コンテナエンジンの呼び出しはすべて [`CommandRunner`] を経由します。
//! 実際にプロセスを起動する [`ProcessRunner`] と、実行せずに記録だけ行う
//! [`DryRunRunner`] を差し替えて使います。

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// 実行するコマンド 1 回分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// 標準入力に渡す内容（表示時には出さない）
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// コマンドの実行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// 終了コード（シグナルで終了した場合は `None`）
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// 正常終了した空の結果
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// コマンド実行の抽象
///
/// 起動できなかった場合のみ `Err` を返す。終了コードの判定は呼び出し側で行う。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput>;
}

/// 実際にプロセスを起動するランナー
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        cmd.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn()?;

        if let Some(input) = &invocation.stdin
            && let Some(mut stdin) = child.stdin.take()
        {
            // 書き込みは best-effort。入力を読まずに終了したコマンドも終了コードで判定する
            match stdin.write_all(input.as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("{} exited before reading stdin", invocation.program);
                }
                Err(e) => {
                    tracing::warn!("Failed to write stdin of {}: {}", invocation.program, e);
                }
            }
            // drop で EOF を送る
        }

        let output = child.wait_with_output().await?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// コマンドを実行せずに記録するランナー（`--dry-run` 用）
#[derive(Debug, Default)]
pub struct DryRunRunner {
    invocations: Mutex<Vec<Invocation>>,
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに受け取ったコマンド
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        tracing::info!("[dry-run] {}", invocation);
        if let Ok(mut list) = self.invocations.lock() {
            list.push(invocation.clone());
        }
        Ok(CommandOutput::ok())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// 指定した回数目の呼び出しで失敗するテスト用ランナー
    #[derive(Debug, Default)]
    pub struct ScriptedRunner {
        calls: Mutex<Vec<Invocation>>,
        fail_at: Option<(usize, i32)>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// `index` 番目（0 始まり）の呼び出しを終了コード `code` で失敗させる
        pub fn failing_at(index: usize, code: i32) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at: Some((index, code)),
            }
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn command_lines(&self) -> Vec<String> {
            self.calls().iter().map(ToString::to_string).collect()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(invocation.clone());

            match self.fail_at {
                Some((at, code)) if at == index => Ok(CommandOutput {
                    code: Some(code),
                    stdout: String::new(),
                    stderr: format!("{} failed", invocation.program),
                }),
                _ => Ok(CommandOutput::ok()),
            }
        }
    }
}
