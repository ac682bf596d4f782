use std::io;
use std::time::Duration;

use native_tls::{Certificate, Identity, TlsConnector};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_native_tls::TlsStream;

use crate::error::ClientError;

/// Dial `host:port` and complete a TLS handshake with the supplied client
/// identity, trust anchored solely to the provided root.
///
/// Hostname verification is disabled: bridge server certificates are not
/// issued for a specific hostname. Chain validation against the pinned root
/// still applies.
pub(crate) async fn connect(
    host: &str,
    port: u16,
    cert_pem: &[u8],
    key_pem: &[u8],
    root_pem: &[u8],
    deadline: Duration,
) -> Result<TlsStream<TcpStream>, ClientError> {
    let identity = Identity::from_pkcs8(cert_pem, key_pem)
        .map_err(|err| ClientError::TrustMaterial(format!("client identity: {err}")))?;
    let root = Certificate::from_pem(root_pem)
        .map_err(|err| ClientError::TrustMaterial(format!("root certificate: {err}")))?;

    let connector = TlsConnector::builder()
        .identity(identity)
        .add_root_certificate(root)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(ClientError::Tls)?;
    let connector = tokio_native_tls::TlsConnector::from(connector);

    let tcp = timeout(deadline, TcpStream::connect((host, port)))
        .await
        .map_err(|_| {
            ClientError::Connect(io::Error::new(
                io::ErrorKind::TimedOut,
                "connect deadline elapsed",
            ))
        })?
        .map_err(ClientError::Connect)?;

    timeout(deadline, connector.connect(host, tcp))
        .await
        .map_err(|_| {
            ClientError::Connect(io::Error::new(
                io::ErrorKind::TimedOut,
                "tls handshake deadline elapsed",
            ))
        })?
        .map_err(ClientError::Tls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_pem_is_a_trust_material_error() {
        let err = connect(
            "127.0.0.1",
            1,
            b"not a certificate",
            b"not a key",
            b"not a root",
            Duration::from_millis(100),
        )
        .await
        .expect_err("must fail");
        assert!(matches!(err, ClientError::TrustMaterial(_)), "got {err:?}");
    }
}
