//! WebSocket connector backed by `tokio-tungstenite`.

use crate::gateway::ports::{TransportError, WebsocketConnector, WebsocketReply};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::collections::BTreeMap;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tracing::debug;

/// [`WebsocketConnector`] opening one connection per exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    /// Creates the connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WebsocketConnector for TungsteniteConnector {
    async fn exchange(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        message: String,
    ) -> Result<WebsocketReply, TransportError> {
        let mut request = url
            .into_client_request()
            .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;
            request.headers_mut().insert(header_name, header_value);
        }

        let (mut stream, _handshake) = connect_async(request)
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        stream
            .send(Message::Text(message))
            .await
            .map_err(|err| TransportError::Io(err.to_string()))?;

        let reply = loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => break WebsocketReply::Text(text),
                Some(Ok(Message::Binary(bytes))) => break WebsocketReply::Binary(bytes),
                Some(Ok(Message::Close(_))) | None => {
                    return Err(TransportError::Io(
                        "connection closed before a reply arrived".to_owned(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(TransportError::Io(err.to_string())),
            }
        };

        if let Err(err) = stream.close(None).await {
            debug!(error = %err, "websocket close failed after reply");
        }
        Ok(reply)
    }
}
