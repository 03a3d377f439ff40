//! logfwd-publish tags コマンドハンドラ

use logfwd_publish_build::derive_tags;
use logfwd_publish_config::CiEnv;

/// タグを 1 行ずつ、または JSON 配列で stdout に出力
pub fn handle(ci: &CiEnv, json: bool) -> anyhow::Result<()> {
    let tags = derive_tags(ci);

    if json {
        println!("{}", serde_json::to_string(&tags)?);
    } else {
        for tag in &tags {
            println!("{}", tag);
        }
    }

    Ok(())
}
