use async_trait::async_trait;
use futures::StreamExt;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use crate::{
    client::ChatService,
    error::{ChatError, ChatResult},
    proto::chat::{chat_api_client::ChatApiClient, SendMessageRequest, StreamRequest},
    server::MessageStream,
    Message,
};

/// A [ChatService] backed by a [ChatServer](crate::ChatServer) over gRPC.
///
/// The channel connects on first use and reconnects by itself afterwards;
/// calls made while the server is unreachable fail with
/// [ChatError::Transport].
#[derive(Debug, Clone)]
pub struct RemoteService {
    client: ChatApiClient<Channel>,
}

impl RemoteService {
    /// Build a service for `endpoint` (e.g. `http://127.0.0.1:7755`)
    /// without connecting yet.
    pub fn connect_lazy(endpoint: impl Into<String>) -> ChatResult<Self> {
        let endpoint = Endpoint::from_shared(endpoint.into())?;
        debug!("Remote chat service for {}", endpoint.uri());
        Ok(Self::new(endpoint.connect_lazy()))
    }

    /// Use an existing channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            client: ChatApiClient::new(channel),
        }
    }
}

#[async_trait]
impl ChatService for RemoteService {
    async fn send_message(&self, sender: &str, text: &str) -> ChatResult<Message> {
        let request = SendMessageRequest {
            sender: sender.to_string(),
            text: text.to_string(),
        };
        let ack = self.client.clone().send_message(request).await?.into_inner();
        Ok(Message {
            id: ack.id,
            sender: sender.to_string(),
            text: text.to_string(),
            created_at: ack.created_at,
        })
    }

    async fn subscribe(&self, since_id: i64) -> ChatResult<MessageStream<Message>> {
        let streaming = self
            .client
            .clone()
            .stream_messages(StreamRequest { since_id })
            .await?
            .into_inner();
        let stream = streaming.map(|result| result.map(Message::from).map_err(ChatError::from));
        Ok(Box::pin(stream))
    }
}
