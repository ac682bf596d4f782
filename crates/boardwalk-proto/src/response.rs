use serde::{Deserialize, Serialize};

/// The literal status line the bridge uses for successful operations.
pub const STATUS_OK: &str = "200 OK";

/// One framed message received from the bridge. Solicited responses echo the
/// request's client tag; unsolicited status frames carry none that matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Response {
    pub header: ResponseHeader,
    #[serde(rename = "CommuniqueType", skip_serializing_if = "Option::is_none")]
    pub communique_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ResponseBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ResponseHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_tag: Option<String>,
}

/// Superset of the response body variants; absent variants deserialize to
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_result: Option<SigningResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping_response: Option<PingInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct StatusInfo {
    pub permissions: Vec<String>,
}

impl StatusInfo {
    /// Whether the listed permissions include `permission`.
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|granted| granted == permission)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ExceptionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Certificates returned by a successful pairing exchange, PEM text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SigningResult {
    pub certificate: String,
    pub root_certificate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PingInfo {
    pub version: f32,
}

impl Response {
    /// Whether the status line is exactly [`STATUS_OK`].
    pub fn is_success(&self) -> bool {
        self.header.status_code.as_deref() == Some(STATUS_OK)
    }

    pub fn client_tag(&self) -> Option<&str> {
        self.header.client_tag.as_deref()
    }

    pub fn exception_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.exception.as_ref())
            .and_then(|exception| exception.message.as_deref())
    }

    /// Whether the frame's status body grants `permission`.
    pub fn grants(&self, permission: &str) -> bool {
        self.body
            .as_ref()
            .and_then(|body| body.status.as_ref())
            .map(|status| status.grants(permission))
            .unwrap_or(false)
    }
}
