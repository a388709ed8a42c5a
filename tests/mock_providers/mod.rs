//! Mock realtime providers for integration tests
//!
//! - `realtime_server`: a local WebSocket server speaking the OpenAI Realtime
//!   event protocol, for exercising the real client
//! - `fake_realtime`: an in-process `BaseRealtime` and factory, for driving the
//!   media bridge without any network

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod fake_realtime;
pub mod realtime_server;

use std::time::Duration;

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
