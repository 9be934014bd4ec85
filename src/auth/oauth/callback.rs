//! One-shot loopback listener receiving the authorization-code redirect.

use crate::auth::error::CredentialError;
use reqwest::Url;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const READ_TIMEOUT: Duration = Duration::from_secs(10);

const SUCCESS_HTML: &str = "<html><body><h1>Authentication complete</h1><p>You can close this window and return to your MCP client.</p></body></html>";
const ERROR_HTML: &str =
    "<html><body><h1>Authentication failed</h1><p>You can close this window.</p></body></html>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallbackPayload {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) error_description: Option<String>,
}

impl CallbackPayload {
    fn is_redirect(&self) -> bool {
        self.code.is_some() || self.error.is_some()
    }
}

pub(crate) struct CallbackListener {
    port: u16,
    v4: TcpListener,
    v6: Option<TcpListener>,
}

impl CallbackListener {
    /// Binds an ephemeral port on 127.0.0.1 and, when possible, the same port
    /// on ::1 since `localhost` may resolve to either.
    pub(crate) async fn bind() -> Result<Self, CredentialError> {
        let v4 = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = v4.local_addr()?.port();
        let v6 = match TcpListener::bind(("::1", port)).await {
            Ok(listener) => Some(listener),
            Err(e) => {
                log::debug!("IPv6 loopback unavailable for OAuth callback: {}", e);
                None
            }
        };
        Ok(Self { port, v4, v6 })
    }

    pub(crate) fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    async fn accept(&self) -> std::io::Result<TcpStream> {
        match &self.v6 {
            Some(v6) => tokio::select! {
                result = self.v4.accept() => result.map(|(s, _)| s),
                result = v6.accept() => result.map(|(s, _)| s),
            },
            None => self.v4.accept().await.map(|(s, _)| s),
        }
    }

    /// Waits for the redirect carrying `code` or `error`. Each connection is
    /// served on its own task, so an idle or unrelated connection (favicon,
    /// preconnect) cannot hold up the redirect.
    pub(crate) async fn wait_for_redirect(
        self,
        expected_state: &str,
        timeout: Duration,
    ) -> Result<CallbackPayload, CredentialError> {
        let (tx, mut rx) = mpsc::channel(1);
        let wait = async {
            loop {
                tokio::select! {
                    accepted = self.accept() => {
                        tokio::spawn(serve_connection(accepted?, tx.clone()));
                    }
                    Some(payload) = rx.recv() => return Ok::<_, CredentialError>(payload),
                }
            }
        };

        let payload = tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| {
                CredentialError::Interactive("timed out waiting for sign-in".to_string())
            })??;

        validate_state(&payload, expected_state)?;
        Ok(payload)
    }
}

async fn serve_connection(mut socket: TcpStream, tx: mpsc::Sender<CallbackPayload>) {
    let mut buffer = vec![0u8; 8192];
    let size = match tokio::time::timeout(READ_TIMEOUT, socket.read(&mut buffer)).await {
        Ok(Ok(size)) if size > 0 => size,
        Ok(Ok(_)) => return,
        Ok(Err(e)) => {
            log::debug!("OAuth callback read failed: {}", e);
            return;
        }
        Err(_) => {
            log::debug!("OAuth callback connection sent no request");
            return;
        }
    };

    let request = String::from_utf8_lossy(&buffer[..size]);
    let payload = match request_target(&request).and_then(parse_redirect_target) {
        Some(payload) if payload.is_redirect() => payload,
        _ => {
            respond(&mut socket, "404 Not Found", "").await;
            return;
        }
    };

    if payload.error.is_some() {
        respond(&mut socket, "400 Bad Request", ERROR_HTML).await;
    } else {
        respond(&mut socket, "200 OK", SUCCESS_HTML).await;
    }
    let _ = tx.send(payload).await;
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn request_target(request: &str) -> Option<&str> {
    let mut parts = request.lines().next()?.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("GET"), Some(target)) if !target.is_empty() => Some(target),
        _ => None,
    }
}

fn parse_redirect_target(target: &str) -> Option<CallbackPayload> {
    let url = Url::parse(&format!("http://localhost{}", target)).ok()?;
    let mut payload = CallbackPayload {
        code: None,
        state: None,
        error: None,
        error_description: None,
    };
    for (key, value) in url.query_pairs() {
        let value = Some(value.into_owned());
        match key.as_ref() {
            "code" => payload.code = value,
            "state" => payload.state = value,
            "error" => payload.error = value,
            "error_description" => payload.error_description = value,
            _ => {}
        }
    }
    Some(payload)
}

fn validate_state(payload: &CallbackPayload, expected: &str) -> Result<(), CredentialError> {
    let state = payload
        .state
        .as_deref()
        .ok_or_else(|| CredentialError::Interactive("redirect is missing state".to_string()))?;
    if !constant_time_eq(state.as_bytes(), expected.as_bytes()) {
        return Err(CredentialError::Interactive(
            "redirect state mismatch".to_string(),
        ));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
