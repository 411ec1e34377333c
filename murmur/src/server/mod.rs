//! The gRPC face of a [MessageStore].
//!
//! [ChatServer] implements the `chat.ChatApi` service: `SendMessage` appends
//! to the store and `StreamMessages` runs one [StreamingSession] per call.
//! A client going away drops its response stream, which releases the
//! session's live registration. Cancelling the server's shutdown token
//! closes every open session and stops accepting connections.
//!
//! Example usage:
//!
//! ``` no_run
//! # use std::net::{Ipv4Addr, SocketAddrV4};
//! # use murmur::{ChatServer, InMemoryPersistence, MessageStore};
//! # use tokio_util::sync::CancellationToken;
//! # async fn inner() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MessageStore::open(InMemoryPersistence::new()).await?;
//! let shutdown = CancellationToken::new();
//! let address = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7755);
//! ChatServer::new(store)
//!     .serve(address.into(), shutdown.clone())
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod session;

use std::{net::SocketAddr, pin::Pin};

use futures::stream::StreamExt;
pub use session::{SessionState, StreamingSession};
use tokio_stream::{wrappers::TcpListenerStream, Stream};
use tokio_util::sync::CancellationToken;
use tonic::{transport::Server, Request, Response, Status};
use tracing::{debug, error, info};

use crate::{
    error::{ChatError, ChatResult},
    persistence::MessagePersistence,
    proto::chat::{
        chat_api_server::{ChatApi, ChatApiServer},
        ChatMessage, SendMessageAck, SendMessageRequest, StreamRequest,
    },
    store::MessageStore,
};

/// A boxed stream of results, as handed out by streaming sessions and
/// client subscriptions.
pub type MessageStream<T, E = ChatError> = Pin<Box<dyn Stream<Item = Result<T, E>> + Send>>;

/// Serves one [MessageStore] over gRPC.
pub struct ChatServer<P> {
    store: MessageStore<P>,
    /// Parent of every session's cancellation token.
    shutdown: CancellationToken,
}

impl<P: MessagePersistence> ChatServer<P> {
    pub fn new(store: MessageStore<P>) -> Self {
        Self {
            store,
            shutdown: CancellationToken::new(),
        }
    }

    /// Bind to `address` and serve until `shutdown` is cancelled.
    pub async fn serve(self, address: SocketAddr, shutdown: CancellationToken) -> ChatResult<()> {
        info!("Chat server running on {}", address);
        let sessions = self.shutdown.clone();
        let result = Server::builder()
            .add_service(ChatApiServer::new(self))
            .serve_with_shutdown(address, Self::stop(shutdown, sessions))
            .await;
        info!("Chat server on {} exited: {:?}", address, result);
        result.map_err(ChatError::from)
    }

    /// Serve connections accepted from an already bound listener until
    /// `shutdown` is cancelled.
    pub async fn serve_with_incoming(
        self,
        incoming: TcpListenerStream,
        shutdown: CancellationToken,
    ) -> ChatResult<()> {
        info!("Chat server running on a provided listener");
        let sessions = self.shutdown.clone();
        let result = Server::builder()
            .add_service(ChatApiServer::new(self))
            .serve_with_incoming_shutdown(incoming, Self::stop(shutdown, sessions))
            .await;
        info!("Chat server exited: {:?}", result);
        result.map_err(ChatError::from)
    }

    /// Resolves once `shutdown` is cancelled, after closing every session.
    async fn stop(shutdown: CancellationToken, sessions: CancellationToken) {
        shutdown.cancelled().await;
        info!("Chat server received shutdown signal");
        sessions.cancel();
    }
}

#[tonic::async_trait]
impl<P: MessagePersistence> ChatApi for ChatServer<P> {
    type StreamMessagesStream = MessageStream<ChatMessage, Status>;

    async fn send_message(
        &self,
        request: Request<SendMessageRequest>,
    ) -> Result<Response<SendMessageAck>, Status> {
        let SendMessageRequest { sender, text } = request.into_inner();
        match self.store.append(sender, text).await {
            Ok(message) => Ok(Response::new(SendMessageAck::from(&message))),
            Err(e) if e.is_invalid_input() => {
                debug!("Rejected message: {}", e);
                Err(e.into())
            }
            Err(e) => {
                error!("Failed to append message: {}", e);
                Err(e.into())
            }
        }
    }

    async fn stream_messages(
        &self,
        request: Request<StreamRequest>,
    ) -> Result<Response<Self::StreamMessagesStream>, Status> {
        let since_id = request.into_inner().since_id;
        let session = StreamingSession::new(
            self.store.clone(),
            since_id,
            self.shutdown.child_token(),
        );
        let stream = session
            .into_stream()
            .map(|result| result.map(ChatMessage::from).map_err(Status::from));
        Ok(Response::new(Box::pin(stream)))
    }
}
