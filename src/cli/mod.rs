use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP assistant API.
    #[arg(long, env = "HTTP_ADDR", default_value = "0.0.0.0:5000")]
    pub http_addr: String,

    /// Optional address for the WebSocket assistant channel (e.g., 0.0.0.0:3000). Disabled when unset.
    #[arg(long, env = "WS_ADDR")]
    pub ws_addr: Option<String>,

    // --- Catalog Args ---
    /// Path to the product catalog JSON file (an array of products with a `name` field).
    #[arg(long, env = "CATALOG_PATH", default_value = "public/data/products.json")]
    pub catalog_path: String,

    // --- TLS Args ---
    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    /// Path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Path to the TLS private key file (PEM format, PKCS8). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    // --- General App Args ---
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let args = Args::try_parse_from(["storefront-assistant"]).unwrap();
        assert_eq!(args.http_addr, "0.0.0.0:5000");
        assert_eq!(args.catalog_path, "public/data/products.json");
        assert!(args.ws_addr.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "storefront-assistant",
            "--http-addr",
            "127.0.0.1:8080",
            "--ws-addr",
            "127.0.0.1:3000",
            "--catalog-path",
            "data/catalog.json",
            "--debug",
        ]).unwrap();
        assert_eq!(args.http_addr, "127.0.0.1:8080");
        assert_eq!(args.ws_addr.as_deref(), Some("127.0.0.1:3000"));
        assert_eq!(args.catalog_path, "data/catalog.json");
        assert_eq!(args.log_filter(), "debug");
    }
}
