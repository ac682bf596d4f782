use boardwalk_proto::{CommuniqueKind, Request, Response};
use tracing::debug;

use crate::config::ClientConfig;
use crate::conn::Connection;
use crate::error::ClientError;
use crate::tls;
use crate::trust::TrustBundle;

const PING_URL: &str = "/server/status/ping";

/// Client for the authenticated session profile, opened with credentials
/// issued by pairing. A thin façade over the connection dispatcher.
pub struct SessionClient {
    conn: Connection,
}

impl SessionClient {
    /// Dial the session port, authenticating with the issued bundle and
    /// trusting only its root certificate.
    pub async fn connect(
        host: &str,
        trust: &TrustBundle,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let stream = tls::connect(
            host,
            config.session_port,
            &trust.cert_pem,
            &trust.key_pem,
            &trust.root_pem,
            config.request_timeout,
        )
        .await?;
        Ok(Self::over(Connection::spawn(stream, config)))
    }

    pub(crate) fn over(conn: Connection) -> Self {
        Self { conn }
    }

    /// Issue an arbitrary request over the session connection.
    pub async fn send_request(&self, request: Request) -> Result<Response, ClientError> {
        self.conn.send_request(request).await
    }

    /// Liveness probe. Succeeds only on an exact `200 OK` status line,
    /// returning the protocol version the bridge reports; any other status
    /// is surfaced as a protocol error carrying that code.
    pub async fn ping(&self) -> Result<f32, ClientError> {
        let request = Request::read(PING_URL).with_communique(CommuniqueKind::ReadRequest);
        let response = self.conn.send_request(request).await?;
        if !response.is_success() {
            return Err(ClientError::rejection(&response));
        }
        let version = response
            .body
            .as_ref()
            .and_then(|body| body.ping_response.as_ref())
            .map(|ping| ping.version)
            .unwrap_or_default();
        debug!(version, "bridge is alive");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardwalk_proto::{
        encode_frame, FrameBuffer, PingInfo, RequestKind, ResponseBody, ResponseHeader, STATUS_OK,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    async fn serve_ping(mut server: DuplexStream, status: &str, body: Option<ResponseBody>) -> Request {
        let mut frames = FrameBuffer::new();
        let mut chunk = [0u8; 4096];
        let request = loop {
            if let Some(request) = frames.next_frame::<Request>().expect("decode request") {
                break request;
            }
            let n = server.read(&mut chunk).await.expect("server read");
            assert!(n > 0, "client closed early");
            frames.extend(&chunk[..n]);
        };

        let response = Response {
            header: ResponseHeader {
                status_code: Some(status.to_string()),
                content_type: None,
                client_tag: request.header.client_tag.clone(),
            },
            communique_kind: None,
            body,
        };
        let frame = encode_frame(&response).expect("encode response");
        server.write_all(&frame).await.expect("server write");
        request
    }

    #[tokio::test]
    async fn ping_succeeds_only_on_the_exact_success_status() {
        let (client_io, server) = tokio::io::duplex(4096);
        let client = SessionClient::over(Connection::spawn(client_io, ClientConfig::default()));

        let server_task = tokio::spawn(serve_ping(
            server,
            STATUS_OK,
            Some(ResponseBody {
                ping_response: Some(PingInfo { version: 1.25 }),
                ..ResponseBody::default()
            }),
        ));

        let version = client.ping().await.expect("ping succeeds");
        assert_eq!(version, 1.25);

        let request = server_task.await.expect("server task");
        assert_eq!(request.header.url, PING_URL);
        assert_eq!(request.header.request_kind, RequestKind::Read);
        assert_eq!(request.communique_kind, Some(CommuniqueKind::ReadRequest));
    }

    #[tokio::test]
    async fn ping_reports_any_other_status_as_a_protocol_error() {
        let (client_io, server) = tokio::io::duplex(4096);
        let client = SessionClient::over(Connection::spawn(client_io, ClientConfig::default()));

        tokio::spawn(serve_ping(server, "503 Service Unavailable", None));

        let err = client.ping().await.expect_err("must fail");
        match err {
            ClientError::Protocol { status, .. } => assert_eq!(status, "503 Service Unavailable"),
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ping_tolerates_a_missing_body_on_success() {
        let (client_io, server) = tokio::io::duplex(4096);
        let client = SessionClient::over(Connection::spawn(client_io, ClientConfig::default()));

        tokio::spawn(serve_ping(server, STATUS_OK, None));

        let version = client.ping().await.expect("ping succeeds");
        assert_eq!(version, 0.0);
    }
}
