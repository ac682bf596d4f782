use boardwalk_proto::{Request, Response};
use tracing::debug;

/// Log one outbound request. With `pretty` set, re-render the frame as
/// indented JSON. A side channel only; nothing here touches the wire.
pub(crate) fn outbound(request: &Request, pretty: bool) {
    if pretty {
        if let Ok(rendered) = serde_json::to_string_pretty(request) {
            debug!(frame = %rendered, "sending request (raw)");
            return;
        }
    }
    debug!(
        url = %request.header.url,
        tag = request.header.client_tag.as_deref().unwrap_or(""),
        "sending request"
    );
}

/// Log one inbound response frame.
pub(crate) fn inbound(response: &Response, pretty: bool) {
    if pretty {
        if let Ok(rendered) = serde_json::to_string_pretty(response) {
            debug!(frame = %rendered, "received response (raw)");
            return;
        }
    }
    debug!(
        status = response.header.status_code.as_deref().unwrap_or(""),
        tag = response.header.client_tag.as_deref().unwrap_or(""),
        "received response"
    );
}
