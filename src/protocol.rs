//! TCP protocol for pose-feeder ↔ coach-server communication.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::pose::PoseEstimate;
use crate::render::FrameBuffer;
use crate::session::FrameReport;

// --- Message types ---

/// Feeder → server
#[derive(Serialize, Deserialize, Debug)]
pub enum ClientMessage {
    Open {
        session: String,
    },
    Close {
        session: String,
    },
    StartWorkout {
        session: String,
        exercises: Vec<String>,
    },
    Frame {
        session: String,
        estimate: PoseEstimate,
        /// Camera pixels to annotate; the server falls back to a blank
        /// canvas when absent.
        pixels: Option<FrameBuffer>,
    },
    Switch {
        session: String,
        exercise: String,
    },
    Reset {
        session: String,
    },
    Query {
        session: String,
        include_frame: bool,
    },
}

/// Server → feeder
#[derive(Serialize, Deserialize, Debug)]
pub enum ServerMessage {
    Ack,
    Report(FrameReport),
    Snapshot(FrameReport),
    AnnotatedFrame {
        report: FrameReport,
        frame: Option<FrameBuffer>,
    },
    Failed {
        message: String,
    },
}

// --- TCP codec helpers ---

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(16 * 1024 * 1024) // 16MB
        .new_codec();
    Framed::new(stream, codec)
}

/// Send a serializable message (bincode + length prefix).
pub async fn send_message<T: Serialize>(
    stream: &mut MessageStream,
    msg: &T,
) -> anyhow::Result<()> {
    let data = bincode::serialize(msg)?;
    stream.send(Bytes::from(data)).await?;
    Ok(())
}

/// Receive and deserialize a message.
pub async fn recv_message<T: DeserializeOwned>(
    stream: &mut MessageStream,
) -> anyhow::Result<T> {
    match stream.next().await {
        Some(Ok(bytes)) => Ok(bincode::deserialize(&bytes)?),
        Some(Err(e)) => Err(e.into()),
        None => Err(anyhow::anyhow!("connection closed")),
    }
}
