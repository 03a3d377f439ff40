//! イメージタグの導出
//!
//! CI 環境から、プッシュするタグの一覧を決定します。
//!
//! # 優先順位
//! 1. リリースタグ（`vMAJOR.MINOR.PATCH`）→ `MAJOR.MINOR.PATCH`, `MAJOR.MINOR`, `MAJOR`
//! 2. ブランチ名 → 英数字とピリオド以外を `-` に置換したもの
//! 3. どちらも無い → `test`
//!
//! リリースタグが形式に合わない場合はエラーにせず、次の規則に進みます。

use logfwd_publish_config::CiEnv;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

/// タグ付けされていないテストビルドのタグ
pub const TEST_TAG: &str = "test";

static RELEASE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v([0-9]+)\.([0-9]+)\.([0-9]+)$").expect("release tag pattern is valid")
});

/// リリースタグから取り出したバージョン
///
/// 数字部分は文字列のまま保持する（`v01.2.3` は `01.2.3` になる）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl ReleaseVersion {
    /// 細かい順に `MAJOR.MINOR.PATCH`, `MAJOR.MINOR`, `MAJOR`
    pub fn tags(&self) -> Vec<String> {
        vec![
            format!("{}.{}.{}", self.major, self.minor, self.patch),
            format!("{}.{}", self.major, self.minor),
            self.major.clone(),
        ]
    }
}

/// `vMAJOR.MINOR.PATCH` 形式ならバージョンを返す
pub fn parse_release_tag(tag: &str) -> Option<ReleaseVersion> {
    let caps = RELEASE_TAG.captures(tag)?;
    Some(ReleaseVersion {
        major: caps[1].to_string(),
        minor: caps[2].to_string(),
        patch: caps[3].to_string(),
    })
}

/// ブランチ名をタグに使える文字列にする
///
/// `[a-zA-Z0-9.]` 以外の文字は 1 文字ずつ `-` に置換する。
pub fn sanitize_branch(branch: &str) -> String {
    branch
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// 順序付きの空でないタグ一覧
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for TagList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// CI 環境からタグを導出
pub fn derive_tags(env: &CiEnv) -> TagList {
    if let Some(tag) = env.tag.as_deref() {
        if let Some(version) = parse_release_tag(tag) {
            return TagList(version.tags());
        }
        tracing::debug!("Release tag '{}' is not vMAJOR.MINOR.PATCH, falling through", tag);
    }

    if let Some(branch) = env.branch.as_deref() {
        return TagList(vec![sanitize_branch(branch)]);
    }

    TagList(vec![TEST_TAG.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(tag: Option<&str>, branch: Option<&str>) -> CiEnv {
        CiEnv::new(tag.map(String::from), branch.map(String::from))
    }

    #[test]
    fn test_release_tag() {
        let tags = derive_tags(&env(Some("v1.2.3"), None));
        assert_eq!(tags.into_vec(), vec!["1.2.3", "1.2", "1"]);
    }

    #[test]
    fn test_release_tag_wins_over_branch() {
        let tags = derive_tags(&env(Some("v2.0.1"), Some("main")));
        assert_eq!(tags.into_vec(), vec!["2.0.1", "2.0", "2"]);
    }

    #[test]
    fn test_branch() {
        let tags = derive_tags(&env(None, Some("feature/foo_bar")));
        assert_eq!(tags.into_vec(), vec!["feature-foo-bar"]);
    }

    #[test]
    fn test_branch_keeps_dots() {
        let tags = derive_tags(&env(None, Some("release/1.4")));
        assert_eq!(tags.into_vec(), vec!["release-1.4"]);
    }

    #[test]
    fn test_no_tag_no_branch() {
        let tags = derive_tags(&env(None, None));
        assert_eq!(tags.into_vec(), vec!["test"]);
    }

    #[test]
    fn test_malformed_release_tag_falls_through_to_branch() {
        let tags = derive_tags(&env(Some("release-1"), Some("main")));
        assert_eq!(tags.into_vec(), vec!["main"]);
    }

    #[test]
    fn test_malformed_release_tag_falls_through_to_test() {
        for tag in ["release-1", "v1.2", "1.2.3", "v1.2.3-rc1", "v1.2.x"] {
            let tags = derive_tags(&env(Some(tag), None));
            assert_eq!(tags.into_vec(), vec!["test"], "tag {tag}");
        }
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let ci = env(Some("v3.10.0"), Some("feature/x"));
        assert_eq!(derive_tags(&ci), derive_tags(&ci));
    }

    #[test]
    fn test_parse_release_tag_keeps_digits_verbatim() {
        let version = parse_release_tag("v01.20.003").unwrap();
        assert_eq!(version.major, "01");
        assert_eq!(version.tags(), vec!["01.20.003", "01.20", "01"]);
    }

    #[test]
    fn test_sanitize_branch_non_ascii() {
        assert_eq!(sanitize_branch("fix/日本語"), "fix----");
        assert_eq!(sanitize_branch("dependabot/npm_and_yarn/a-b"), "dependabot-npm-and-yarn-a-b");
    }

    #[test]
    fn test_tag_list_display_and_json() {
        let tags = derive_tags(&env(Some("v1.2.3"), None));
        assert_eq!(tags.to_string(), "[1.2.3, 1.2, 1]");
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["1.2.3","1.2","1"]"#);
    }
}
