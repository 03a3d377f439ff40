//! logfwd イメージの公開処理
//!
//! このクレートは CI 上で logfwd の Docker イメージを公開するための機能を提供します。
//! タグの導出、イメージのビルド、レジストリへのログイン、タグ付けとプッシュを
//! コンテナエンジンの CLI を通して順番に実行します。

pub mod artifact;
pub mod auth;
pub mod builder;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod pusher;
pub mod runner;
pub mod tags;

pub use artifact::{ArtifactStatus, artifact_status, ensure_artifact};
pub use auth::{RegistryAuth, extract_registry};
pub use builder::ImageBuilder;
pub use engine::Engine;
pub use error::{BuildError, BuildResult};
pub use pipeline::{PublishReport, Publisher};
pub use pusher::{ImagePusher, validate_tag};
pub use runner::{CommandOutput, CommandRunner, DryRunRunner, Invocation, ProcessRunner};
pub use tags::{ReleaseVersion, TagList, derive_tags, parse_release_tag, sanitize_branch};
