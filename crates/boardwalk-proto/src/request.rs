use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic intent of a request. Carried in the header; has no effect on
/// framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Read,
    Execute,
    Subscribe,
}

/// Optional top-level communiqué marker some endpoints expect alongside the
/// header kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommuniqueKind {
    CreateRequest,
    ReadRequest,
    SubscribeRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestHeader {
    #[serde(rename = "RequestType")]
    pub request_kind: RequestKind,
    pub url: String,
    /// Correlation tag: generated by the client per send and echoed verbatim
    /// by the matching response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub header: RequestHeader,
    #[serde(rename = "CommuniqueType", skip_serializing_if = "Option::is_none")]
    pub communique_kind: Option<CommuniqueKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Request {
    /// A Read request for `url`.
    pub fn read(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Read, url)
    }

    /// An Execute request for `url`.
    pub fn execute(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Execute, url)
    }

    /// A Subscribe request for `url`.
    pub fn subscribe(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Subscribe, url)
    }

    fn new(kind: RequestKind, url: impl Into<String>) -> Self {
        Self {
            header: RequestHeader {
                request_kind: kind,
                url: url.into(),
                client_tag: None,
            },
            communique_kind: None,
            body: None,
        }
    }

    pub fn with_communique(mut self, kind: CommuniqueKind) -> Self {
        self.communique_kind = Some(kind);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }
}

/// Command catalog shared by both body shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    #[serde(rename = "CSR")]
    Csr,
    GoToDimmedLevel,
    GoToFanSpeed,
    GoToLevel,
    PressAndRelease,
}

/// Structural superset of the two request body shapes: the pre-auth generic
/// form (`command_kind` + `parameters`) and the post-auth command form
/// (`command`). Unset fields are absent from the serialized object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Body {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(rename = "CommandType", skip_serializing_if = "Option::is_none")]
    pub command_kind: Option<CommandKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl Body {
    /// The post-authentication shape: a typed device command.
    pub fn command(command: Command) -> Self {
        Self {
            command: Some(command),
            command_kind: None,
            parameters: None,
        }
    }

    /// The pre-authentication shape: a command kind plus a free-form
    /// parameter map.
    pub fn parameters(kind: CommandKind, parameters: Map<String, Value>) -> Self {
        Self {
            command: None,
            command_kind: Some(kind),
            parameters: Some(parameters),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Command {
    #[serde(rename = "CommandType")]
    pub command_kind: CommandKind,
    #[serde(
        rename = "DimmedLevelParameters",
        skip_serializing_if = "Option::is_none"
    )]
    pub dimmed_level: Option<DimmedLevelParameters>,
    #[serde(rename = "FanSpeedParameters", skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<FanSpeedParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<Parameter>>,
}

impl Command {
    fn bare(kind: CommandKind) -> Self {
        Self {
            command_kind: kind,
            dimmed_level: None,
            fan_speed: None,
            parameter: None,
        }
    }

    /// Jump a zone straight to `level`.
    pub fn go_to_level(level: i64) -> Self {
        let mut command = Self::bare(CommandKind::GoToLevel);
        command.parameter = Some(vec![Parameter {
            kind: "Level".into(),
            value: level,
        }]);
        command
    }

    /// Fade a zone to `level` over `fade`.
    pub fn go_to_dimmed_level(level: i64, fade: Duration) -> Self {
        let mut command = Self::bare(CommandKind::GoToDimmedLevel);
        command.dimmed_level = Some(DimmedLevelParameters {
            level,
            fade_time: format_fade_time(fade),
        });
        command
    }

    /// Set a fan zone to the named speed.
    pub fn go_to_fan_speed(speed: impl Into<String>) -> Self {
        let mut command = Self::bare(CommandKind::GoToFanSpeed);
        command.fan_speed = Some(FanSpeedParameters {
            fan_speed: speed.into(),
        });
        command
    }

    /// Tap a virtual button.
    pub fn press_and_release() -> Self {
        Self::bare(CommandKind::PressAndRelease)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimmedLevelParameters {
    pub level: i64,
    pub fade_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FanSpeedParameters {
    pub fan_speed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Parameter")]
    pub kind: String,
    pub value: i64,
}

/// Render a duration in the `hh:mm:ss` form the bridge expects for fades.
pub fn format_fade_time(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_request_omits_unset_sections() {
        let request = Request::read("/system/macaddress");
        let wire = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            wire,
            json!({
                "Header": {
                    "RequestType": "Read",
                    "Url": "/system/macaddress",
                }
            })
        );
    }

    #[test]
    fn execute_request_serializes_generic_body() {
        let mut parameters = Map::new();
        parameters.insert("Role".into(), Value::String("Admin".into()));
        let mut request =
            Request::execute("/pair").with_body(Body::parameters(CommandKind::Csr, parameters));
        request.header.client_tag = Some("tag-1".into());

        let wire = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            wire,
            json!({
                "Header": {
                    "RequestType": "Execute",
                    "Url": "/pair",
                    "ClientTag": "tag-1",
                },
                "Body": {
                    "CommandType": "CSR",
                    "Parameters": {"Role": "Admin"},
                }
            })
        );
    }

    #[test]
    fn ping_request_carries_communique_kind() {
        let request = Request::read("/server/status/ping").with_communique(CommuniqueKind::ReadRequest);
        let wire = serde_json::to_value(&request).expect("serialize");
        assert_eq!(wire["CommuniqueType"], "ReadRequest");
    }

    #[test]
    fn command_constructors_match_wire_shapes() {
        let wire = serde_json::to_value(Body::command(Command::go_to_level(42))).expect("serialize");
        assert_eq!(
            wire,
            json!({
                "Command": {
                    "CommandType": "GoToLevel",
                    "Parameter": [{"Parameter": "Level", "Value": 42}],
                }
            })
        );

        let wire = serde_json::to_value(Command::go_to_dimmed_level(30, Duration::from_secs(90)))
            .expect("serialize");
        assert_eq!(
            wire,
            json!({
                "CommandType": "GoToDimmedLevel",
                "DimmedLevelParameters": {"Level": 30, "FadeTime": "00:01:30"},
            })
        );

        let wire = serde_json::to_value(Command::go_to_fan_speed("Medium")).expect("serialize");
        assert_eq!(wire["FanSpeedParameters"]["FanSpeed"], "Medium");

        let wire = serde_json::to_value(Command::press_and_release()).expect("serialize");
        assert_eq!(wire, json!({"CommandType": "PressAndRelease"}));
    }

    #[test]
    fn fade_time_formats_as_hms() {
        assert_eq!(format_fade_time(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_fade_time(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_fade_time(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_fade_time(Duration::from_secs(3_725)), "01:02:05");
    }
}
