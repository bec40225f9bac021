//! Helpers shared by apibridge integration tests.

use anyhow::Context as _;
use std::net::TcpListener;
use std::process::Child;
use std::time::{Duration, Instant};

/// Kills the wrapped child process when dropped so a failing test never
/// leaks a server process.
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
    }
}

/// Pick a free TCP port on localhost.
///
/// The port is not reserved; another process may still bind it before the
/// caller does.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails or the
/// bound address cannot be read.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Poll `url` until it answers with a success status.
///
/// # Errors
///
/// Returns an error if the timeout elapses first.
pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let deadline = Instant::now() + timeout_dur;
    loop {
        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ if Instant::now() > deadline => anyhow::bail!("timed out waiting for {url}"),
            _ => tokio::time::sleep(Duration::from_millis(100)).await,
        }
    }
}
