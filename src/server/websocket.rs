use super::tls::{ load_tls_config, TlsPaths };
use super::ServerError;
use crate::agent::{ Assistant, Intent, Reply };
use crate::models::websocket::{ ClientMessage, Expression, ServerMessage };

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::io::{ AsyncRead, AsyncWrite };

use tokio_tungstenite::{ accept_async, WebSocketStream };
use tokio_tungstenite::tungstenite::{ self, protocol::Message };
use tokio_rustls::TlsAcceptor;

use chrono::Utc;
use futures::{ SinkExt, StreamExt };
use log::{ info, warn, error, debug };
use uuid::Uuid;

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

pub const PROCESSING_ERROR_TEXT: &str =
    "I'm sorry, I encountered an error processing your request.";

pub fn expression_for(reply: &Reply) -> Expression {
    match reply.intent {
        Intent::Greeting | Intent::Thanks => Expression::Happy,
        Intent::ProductSearch => match reply.matches {
            Some(n) if n > 0 => Expression::Happy,
            _ => Expression::Sad,
        },
        Intent::Browse | Intent::Fallback => Expression::Neutral,
    }
}

fn server_message(text: impl Into<String>, expression: Expression) -> ServerMessage {
    ServerMessage { text: text.into(), expression, timestamp: Utc::now().timestamp() }
}

pub async fn start_ws_server(
    addr: &str,
    assistant: Assistant,
    tls: Option<TlsPaths>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    let tls_acceptor = match tls {
        Some(paths) => Some(TlsAcceptor::from(load_tls_config(&paths)?)),
        None => None,
    };
    let protocol = if tls_acceptor.is_some() { "wss" } else { "ws" };
    info!("{} assistant channel listening on: {}", protocol.to_uppercase(), addr);

    serve(listener, assistant, tls_acceptor).await
}

/// Accept loop; each connection is handled on its own task.
pub async fn serve(
    listener: TcpListener,
    assistant: Assistant,
    tls_acceptor: Option<TlsAcceptor>,
) -> Result<(), ServerError> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Incoming connection from: {}", peer);

        let assistant = assistant.clone();
        let tls_acceptor = tls_acceptor.clone();

        tokio::spawn(async move {
            let result = match tls_acceptor {
                Some(acceptor) => {
                    match acceptor.accept(stream).await {
                        Ok(tls_stream) => {
                            debug!("TLS handshake successful for {}", peer);
                            process_connection(peer, tls_stream, assistant).await
                        }
                        Err(e) => {
                            error!("TLS handshake error for {}: {}", peer, e);
                            return;
                        }
                    }
                }
                None => process_connection(peer, stream, assistant).await,
            };

            if let Err(e) = result {
                error!("Handshake failed for {}: {}", peer, e);
            }
        });
    }
}

async fn process_connection<S>(
    peer: SocketAddr,
    stream: S,
    assistant: Assistant,
) -> Result<(), tungstenite::Error>
    where S: AsyncRead + AsyncWrite + Unpin
{
    let ws = accept_async(stream).await?;
    handle_connection(peer, ws, assistant).await;
    Ok(())
}

async fn send_message<S>(
    tx: &mut futures::stream::SplitSink<WebSocketStream<S>, Message>,
    message: &ServerMessage,
) -> Result<(), tungstenite::Error>
    where S: AsyncRead + AsyncWrite + Unpin
{
    match serde_json::to_string(message) {
        Ok(json) => tx.send(Message::Text(json)).await,
        Err(e) => {
            error!("Failed to encode server message: {}", e);
            Ok(())
        }
    }
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    assistant: Assistant,
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    let (mut tx, mut rx) = websocket.split();
    let connection_id = Uuid::new_v4();
    info!("Assigned connection ID {} to {}", connection_id, peer);

    while let Some(msg) = rx.next().await {
        let message = match msg {
            Ok(message) => message,
            Err(e) => {
                match e {
                    | tungstenite::Error::ConnectionClosed
                    | tungstenite::Error::Protocol(_)
                    | tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    tungstenite::Error::Io(ref io_err) if
                        io_err.kind() == std::io::ErrorKind::ConnectionReset
                    => {
                        info!("WebSocket connection reset by peer {}", peer);
                    }
                    _ => {
                        error!("Error receiving message from {}: {}", peer, e);
                    }
                }
                break;
            }
        };

        if message.len() > MAX_MESSAGE_SIZE {
            warn!(
                "Message from {} exceeds size limit ({} > {})",
                peer,
                message.len(),
                MAX_MESSAGE_SIZE
            );
            let reply = server_message("Message too large", Expression::Sad);
            if send_message(&mut tx, &reply).await.is_err() {
                error!("Failed to send size limit error to {}", peer);
            }
            if let Err(e) = tx.send(Message::Close(None)).await {
                debug!("Failed to send close frame to {}: {}", peer, e);
            }
            break;
        }

        match message {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage { message }) => {
                        let reply = assistant.process_message(&message);
                        server_message(reply.text.clone(), expression_for(&reply))
                    }
                    Err(e) => {
                        warn!("Invalid message from {}: {}", peer, e);
                        server_message(PROCESSING_ERROR_TEXT, Expression::Sad)
                    }
                };
                if let Err(e) = send_message(&mut tx, &reply).await {
                    error!("Error sending message to {}: {}", peer, e);
                    break;
                }
            }
            Message::Close(_) => {
                info!("Client {} requested close", peer);
                break;
            }
            Message::Binary(_) => {
                warn!("Ignoring binary message from {}", peer);
            }
            // tungstenite queues pong replies itself
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
    info!("WebSocket connection closed for {} (Conn ID: {})", peer, connection_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(intent: Intent, matches: Option<usize>) -> Reply {
        Reply { intent, text: String::new(), matches }
    }

    #[test]
    fn expressions_follow_intent() {
        assert_eq!(expression_for(&reply(Intent::Greeting, None)), Expression::Happy);
        assert_eq!(expression_for(&reply(Intent::Thanks, None)), Expression::Happy);
        assert_eq!(expression_for(&reply(Intent::ProductSearch, Some(3))), Expression::Happy);
        assert_eq!(expression_for(&reply(Intent::ProductSearch, Some(0))), Expression::Sad);
        assert_eq!(expression_for(&reply(Intent::Browse, None)), Expression::Neutral);
        assert_eq!(expression_for(&reply(Intent::Fallback, None)), Expression::Neutral);
    }

    #[test]
    fn server_message_serializes_lowercase_expression() {
        let json = serde_json::to_value(server_message("hi", Expression::Happy)).unwrap();
        assert_eq!(json["text"], "hi");
        assert_eq!(json["expression"], "happy");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }
}
