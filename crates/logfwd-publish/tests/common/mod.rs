use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// ビルドコンテキストとして使う一時ディレクトリ
pub struct TestWorkspace {
    pub root: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    /// コンテキストにアーティファクトを置く
    pub fn write_artifact(&self) {
        fs::write(self.root.path().join("logfwd"), "#!/bin/sh\n").unwrap();
    }

    /// 呼び出しを記録する偽のコンテナエンジンを作成
    ///
    /// 引数を `engine.log` に 1 行ずつ追記し、`login` では標準入力も記録する。
    /// `FAKE_ENGINE_FAIL_PUSH` に一致するイメージの push は終了コード 3 で失敗する。
    #[allow(dead_code)]
    #[cfg(unix)]
    pub fn write_fake_engine(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let bin_dir = self.root.path().join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        let engine = bin_dir.join("fake-engine");
        let log = self.log_path();

        fs::write(
            &engine,
            format!(
                r#"#!/bin/sh
echo "$@" >> "{log}"
if [ "$1" = "login" ]; then
    read -r password
    echo "stdin=$password" >> "{log}"
fi
if [ "$1" = "push" ] && [ "$2" = "$FAKE_ENGINE_FAIL_PUSH" ]; then
    echo "denied: requested access to the resource is denied" >&2
    exit 3
fi
exit 0
"#,
                log = log.display()
            ),
        )
        .unwrap();
        fs::set_permissions(&engine, fs::Permissions::from_mode(0o755)).unwrap();

        engine
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.path().join("engine.log")
    }

    #[allow(dead_code)]
    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}
