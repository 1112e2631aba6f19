//! Coach server: accepts pose streams over TCP, runs rep counting and form
//! checks per session, and answers every request with exactly one reply.
//!
//! Wire format is length-delimited bincode (see `kamae_coach::protocol`).

use anyhow::{Context, Result};
use tokio::net::TcpStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kamae_coach::config::Config;
use kamae_coach::protocol::{self, ClientMessage, ServerMessage};
use kamae_coach::session::SessionRegistry;

const CONFIG_PATH: &str = "coach.toml";

/// Map one client request onto the registry and build the reply.
/// Domain errors become `Failed` replies; the connection stays up.
fn dispatch(registry: &SessionRegistry, msg: ClientMessage) -> ServerMessage {
    let result = match msg {
        ClientMessage::Open { session } => {
            registry.open(&session);
            Ok(ServerMessage::Ack)
        }
        ClientMessage::Close { session } => {
            registry.close(&session).map(|_| ServerMessage::Ack)
        }
        ClientMessage::StartWorkout { session, exercises } => registry
            .start_workout(&session, &exercises)
            .map(|_| ServerMessage::Ack),
        ClientMessage::Frame {
            session,
            estimate,
            pixels,
        } => registry
            .process_frame(&session, &estimate, pixels)
            .map(ServerMessage::Report),
        ClientMessage::Switch { session, exercise } => registry
            .switch_exercise(&session, &exercise)
            .map(|_| ServerMessage::Ack),
        ClientMessage::Reset { session } => {
            registry.reset_counter(&session).map(|_| ServerMessage::Ack)
        }
        ClientMessage::Query {
            session,
            include_frame: false,
        } => registry.poll(&session).map(ServerMessage::Snapshot),
        ClientMessage::Query {
            session,
            include_frame: true,
        } => registry.poll(&session).and_then(|report| {
            let frame = registry.latest_frame(&session)?;
            Ok(ServerMessage::AnnotatedFrame { report, frame })
        }),
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, recoverable = e.is_recoverable(), "request rejected");
            ServerMessage::Failed {
                message: e.to_string(),
            }
        }
    }
}

async fn handle_client(stream: TcpStream, registry: SessionRegistry) -> Result<()> {
    let mut stream = protocol::message_stream(stream);
    loop {
        let msg: ClientMessage = protocol::recv_message(&mut stream).await?;
        let reply = dispatch(&registry, msg);
        protocol::send_message(&mut stream, &reply).await?;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load_or_default(CONFIG_PATH);
    info!("Coach Server ({})", env!("GIT_VERSION"));
    info!(
        bind = %config.server.bind_addr,
        visibility_threshold = config.detection.visibility_threshold,
        plan_profile = %config.plan.profile,
        "config loaded"
    );

    let registry = SessionRegistry::new(config.detection.visibility_threshold);

    let bind_addr: std::net::SocketAddr = config
        .server
        .bind_addr
        .parse()
        .context("invalid bind_addr")?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "listening");

    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        };
        stream.set_nodelay(true)?;
        info!(%addr, "client connected");

        let registry = registry.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, registry).await {
                info!(%addr, reason = %e, "client disconnected");
            }
        });
    }

    info!(sessions = registry.session_count(), "coach server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kamae_coach::pose::{Pose, PoseEstimate};

    fn one_person(width: u32, height: u32) -> PoseEstimate {
        PoseEstimate::new(vec![Pose::default()], width, height)
    }

    #[test]
    fn test_dispatch_open_then_query() {
        let registry = SessionRegistry::new(0.5);
        let reply = dispatch(
            &registry,
            ClientMessage::Open {
                session: "s1".into(),
            },
        );
        assert!(matches!(reply, ServerMessage::Ack));

        let reply = dispatch(
            &registry,
            ClientMessage::Query {
                session: "s1".into(),
                include_frame: false,
            },
        );
        match reply {
            ServerMessage::Snapshot(report) => {
                assert!(report.snapshot.is_none());
                assert!(!report.multiple_people);
            }
            other => panic!("wrong reply: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_unknown_session_fails() {
        let registry = SessionRegistry::new(0.5);
        let reply = dispatch(
            &registry,
            ClientMessage::Frame {
                session: "nobody".into(),
                estimate: one_person(640, 480),
                pixels: None,
            },
        );
        match reply {
            ServerMessage::Failed { message } => {
                assert!(message.contains("unknown session"), "got: {}", message)
            }
            other => panic!("wrong reply: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_frame_then_annotated_query() {
        let registry = SessionRegistry::new(0.5);
        dispatch(
            &registry,
            ClientMessage::Open {
                session: "s1".into(),
            },
        );
        dispatch(
            &registry,
            ClientMessage::StartWorkout {
                session: "s1".into(),
                exercises: vec!["squats".into()],
            },
        );

        let reply = dispatch(
            &registry,
            ClientMessage::Frame {
                session: "s1".into(),
                estimate: one_person(640, 480),
                pixels: None,
            },
        );
        match reply {
            ServerMessage::Report(report) => {
                let snap = report.snapshot.unwrap();
                assert_eq!(snap.exercise, "Squats");
                assert_eq!(snap.count, 0);
            }
            other => panic!("wrong reply: {:?}", other),
        }

        let reply = dispatch(
            &registry,
            ClientMessage::Query {
                session: "s1".into(),
                include_frame: true,
            },
        );
        match reply {
            ServerMessage::AnnotatedFrame { report, frame } => {
                assert!(report.snapshot.is_some());
                let frame = frame.unwrap();
                assert_eq!(frame.width, 640);
                assert_eq!(frame.height, 480);
            }
            other => panic!("wrong reply: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_reset_requires_workout() {
        let registry = SessionRegistry::new(0.5);
        dispatch(
            &registry,
            ClientMessage::Open {
                session: "s1".into(),
            },
        );
        let reply = dispatch(
            &registry,
            ClientMessage::Reset {
                session: "s1".into(),
            },
        );
        match reply {
            ServerMessage::Failed { message } => {
                assert!(message.contains("no active workout"), "got: {}", message)
            }
            other => panic!("wrong reply: {:?}", other),
        }
    }
}
