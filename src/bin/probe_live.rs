//! Probe: live update WebSocket
//!
//! Connects to the predictions socket and:
//! - Prints the greeting the backend sends on connect
//! - Sends one text frame (the backend echoes it back)
//! - Logs every message for 30 seconds

use std::time::{Duration, Instant};

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use prizeedge::LIVE_WS_URL;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<()> {
    let url = std::env::args().nth(1).unwrap_or_else(|| LIVE_WS_URL.to_string());
    println!("=== Probe: live updates ===");
    println!("URL: {url}");
    println!();

    println!("--- Connecting ---");
    let (ws_stream, response) = connect_async(url.as_str()).await?;
    println!("Connected! Response status: {}", response.status());
    println!();

    let (mut write, mut read) = ws_stream.split();
    write.send(Message::Text("probe".into())).await?;

    println!("--- Listening for 30 seconds ---");
    let start = Instant::now();
    let timeout = Duration::from_secs(30);
    let mut msg_count = 0;

    loop {
        let remaining = timeout.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }

        match tokio::time::timeout(Duration::from_secs(1), read.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                msg_count += 1;
                let kind = serde_json::from_str::<serde_json::Value>(text.as_str())
                    .ok()
                    .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
                    .unwrap_or_else(|| "raw".to_string());
                println!(
                    "[{:.1}s] #{} type={}: {}",
                    start.elapsed().as_secs_f64(),
                    msg_count,
                    kind,
                    text.as_str()
                );
            }
            Ok(Some(Ok(Message::Close(frame)))) => {
                println!("[{:.1}s] Close: {:?}", start.elapsed().as_secs_f64(), frame);
                break;
            }
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => {
                println!("WebSocket error: {e}");
                break;
            }
            Ok(None) => {
                println!("WebSocket stream ended");
                break;
            }
            Err(_) => continue,
        }
    }

    println!();
    println!("--- Summary ---");
    println!("Total messages received: {msg_count}");
    println!("Duration: {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}
