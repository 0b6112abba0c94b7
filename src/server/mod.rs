pub mod api;
pub mod tls;
pub mod websocket;

use crate::agent::Assistant;
use crate::cli::Args;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("TLS configuration error: {0}")]
    Tls(String),
    #[error("Server I/O error: {0}")]
    Io(#[from] io::Error),
}

pub struct Server {
    assistant: Assistant,
    args: Args,
}

impl Server {
    pub fn new(assistant: Assistant, args: Args) -> Self {
        Self { assistant, args }
    }

    /// Runs the HTTP API and, when configured, the WebSocket channel until one
    /// of them fails.
    pub async fn run(&self) -> Result<(), ServerError> {
        let tls = tls::tls_paths(&self.args)?;

        let http = api::start_http_server(
            &self.args.http_addr,
            self.assistant.clone(),
            tls.clone(),
        );

        match &self.args.ws_addr {
            Some(ws_addr) => {
                let ws = websocket::start_ws_server(ws_addr, self.assistant.clone(), tls);
                tokio::try_join!(http, ws)?;
            }
            None => http.await?,
        }

        Ok(())
    }
}
