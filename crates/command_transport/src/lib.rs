use std::net::SocketAddr;

use anyhow::Context;
use async_trait::async_trait;
use shared::protocol::{ChannelEnvelope, ControlCommand};
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// Outbound side of the control loop. Retry and timeout policy belong to the
/// implementation; callers log failures and move on to the next tick.
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    fn channel(&self) -> &str;
    async fn publish(&self, command: &ControlCommand) -> anyhow::Result<()>;
}

/// Sends each command as one JSON datagram wrapped in a [`ChannelEnvelope`].
pub struct UdpPublisher {
    channel: String,
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpPublisher {
    pub async fn bind(
        channel: impl Into<String>,
        bind: SocketAddr,
        target: SocketAddr,
    ) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(bind)
            .await
            .with_context(|| format!("failed to bind control socket on {bind}"))?;
        let channel = channel.into();
        info!(%channel, %target, local = ?socket.local_addr().ok(), "udp publisher ready");
        Ok(Self {
            channel,
            socket,
            target,
        })
    }
}

#[async_trait]
impl CommandPublisher for UdpPublisher {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn publish(&self, command: &ControlCommand) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&ChannelEnvelope {
            channel: &self.channel,
            command,
        })?;
        self.socket
            .send_to(&payload, self.target)
            .await
            .with_context(|| format!("failed to send control command to {}", self.target))?;
        Ok(())
    }
}

/// Dry-run publisher: commands only reach the log.
pub struct LogPublisher {
    channel: String,
}

impl LogPublisher {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl CommandPublisher for LogPublisher {
    fn channel(&self) -> &str {
        &self.channel
    }

    async fn publish(&self, command: &ControlCommand) -> anyhow::Result<()> {
        debug!(
            channel = %self.channel,
            sequence_num = command.header.sequence_num,
            payload = %serde_json::to_string(command)?,
            "control command"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
