//! Pose feeder: replays a JSONL pose recording over TCP to the coach server
//! at a fixed frame rate and prints rep count and state transitions.
//!
//! Only imports from `kamae_coach::protocol` and `kamae_coach::pose`. Each
//! recording line is one JSON-encoded pose estimate.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use kamae_coach::pose::PoseEstimate;
use kamae_coach::protocol::{self, ClientMessage, MessageStream, ServerMessage};

// ---------------------------------------------------------------------------
// Config (inline, reads pose_feeder.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    recording: String,
    exercises: Vec<String>,
    #[serde(default = "default_server_addr")]
    server_addr: String,
    #[serde(default = "default_session")]
    session: String,
    #[serde(default = "default_fps")]
    fps: f64,
    #[serde(default)]
    loop_playback: bool,
    #[serde(default)]
    verbose: bool,
}

fn default_server_addr() -> String {
    "127.0.0.1:9100".to_string()
}

fn default_session() -> String {
    "local".to_string()
}

fn default_fps() -> f64 {
    30.0
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

fn parse_recording(path: &str, text: &str) -> Result<Vec<PoseEstimate>> {
    let mut frames = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let estimate: PoseEstimate = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: bad frame", path, lineno + 1))?;
        frames.push(estimate);
    }
    if frames.is_empty() {
        bail!("recording {} has no frames", path);
    }
    Ok(frames)
}

fn load_recording(path: &str) -> Result<Vec<PoseEstimate>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    parse_recording(path, &text)
}

// ---------------------------------------------------------------------------
// TCP client session
// ---------------------------------------------------------------------------

async fn expect_ack(stream: &mut MessageStream, what: &str) -> Result<()> {
    let reply: ServerMessage = protocol::recv_message(stream).await?;
    match reply {
        ServerMessage::Ack => Ok(()),
        ServerMessage::Failed { message } => bail!("server rejected {}: {}", what, message),
        other => bail!("expected Ack for {}, got {other:?}", what),
    }
}

async fn run_session(
    mut stream: MessageStream,
    config: &Config,
    frames: &[PoseEstimate],
) -> Result<()> {
    protocol::send_message(
        &mut stream,
        &ClientMessage::Open {
            session: config.session.clone(),
        },
    )
    .await?;
    expect_ack(&mut stream, "open").await?;

    protocol::send_message(
        &mut stream,
        &ClientMessage::StartWorkout {
            session: config.session.clone(),
            exercises: config.exercises.clone(),
        },
    )
    .await?;
    expect_ack(&mut stream, "workout").await?;
    eprintln!("[tcp] workout started: {:?}", config.exercises);

    let interval = Duration::from_secs_f64(1.0 / config.fps);
    let mut ticker = tokio::time::interval(interval);
    let mut last_count: u32 = 0;
    let mut last_state = String::new();
    let mut last_multiple = false;
    let mut sent: u64 = 0;

    loop {
        for estimate in frames {
            ticker.tick().await;
            protocol::send_message(
                &mut stream,
                &ClientMessage::Frame {
                    session: config.session.clone(),
                    estimate: estimate.clone(),
                    pixels: None,
                },
            )
            .await?;
            sent += 1;

            let reply: ServerMessage = protocol::recv_message(&mut stream).await?;
            match reply {
                ServerMessage::Report(report) => {
                    if report.multiple_people != last_multiple {
                        last_multiple = report.multiple_people;
                        if last_multiple {
                            eprintln!("[report] multiple people in frame, tracking the first");
                        }
                    }
                    if let Some(snap) = report.snapshot {
                        let changed = snap.count != last_count || snap.state != last_state;
                        if changed || config.verbose {
                            println!("{}  reps={}  state={}", snap.exercise, snap.count, snap.state);
                        }
                        last_count = snap.count;
                        last_state = snap.state;
                    }
                }
                ServerMessage::Failed { message } => bail!("server rejected frame: {}", message),
                other => bail!("expected Report, got {other:?}"),
            }
        }
        if !config.loop_playback {
            break;
        }
    }
    eprintln!("[done] {} frames sent", sent);

    protocol::send_message(
        &mut stream,
        &ClientMessage::Query {
            session: config.session.clone(),
            include_frame: false,
        },
    )
    .await?;
    let reply: ServerMessage = protocol::recv_message(&mut stream).await?;
    match reply {
        ServerMessage::Snapshot(report) => match report.snapshot {
            Some(snap) => {
                println!("final: {}  reps={}  state={}", snap.exercise, snap.count, snap.state)
            }
            None => println!("final: no active workout"),
        },
        other => bail!("expected Snapshot, got {other:?}"),
    }

    protocol::send_message(
        &mut stream,
        &ClientMessage::Close {
            session: config.session.clone(),
        },
    )
    .await?;
    expect_ack(&mut stream, "close").await
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let config_str =
        std::fs::read_to_string("pose_feeder.toml").context("failed to read pose_feeder.toml")?;
    let config: Config = toml::from_str(&config_str)?;
    if config.fps <= 0.0 {
        bail!("fps must be positive, got {}", config.fps);
    }
    if config.exercises.is_empty() {
        bail!("exercises list is empty");
    }

    let frames = load_recording(&config.recording)?;
    eprintln!("Pose Feeder ({})", env!("GIT_VERSION"));
    eprintln!(
        "[config] server_addr={}, session={}, fps={}, frames={}",
        config.server_addr,
        config.session,
        config.fps,
        frames.len()
    );

    loop {
        eprintln!("[tcp] connecting to {}...", config.server_addr);
        match tokio::net::TcpStream::connect(&config.server_addr).await {
            Ok(tcp) => {
                tcp.set_nodelay(true)?;
                eprintln!("[tcp] connected");
                let stream = protocol::message_stream(tcp);
                match run_session(stream, &config, &frames).await {
                    Ok(()) => break,
                    Err(e) => eprintln!("[tcp] session error: {e:#}"),
                }
            }
            Err(e) => eprintln!("[tcp] connection failed: {e}"),
        }
        eprintln!("[tcp] retrying in 2s...");
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    Ok(())
}
