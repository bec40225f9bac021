use anyhow::Context as _;
use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;

pub use apibridge_test_support::KillOnDrop;

pub fn pick_unused_port() -> anyhow::Result<u16> {
    apibridge_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    apibridge_test_support::wait_http_ok(url, timeout_dur).await
}

pub fn spawn_server(config: &Path, tools: &Path, port: u16) -> anyhow::Result<Child> {
    let bin = env!("CARGO_BIN_EXE_apibridge-server");
    Command::new(bin)
        .arg("--config")
        .arg(config)
        .arg("--tools")
        .arg(tools)
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .spawn()
        .context("spawn apibridge-server")
}
