//! Wire protocol definitions for the bridge's framed-JSON transport.
//!
//! Every message is one UTF-8 JSON object terminated by `\r\n`, with no
//! length prefix; correlation between requests and responses rides on the
//! client tag echoed in response headers. Keeping the shapes in a dedicated
//! crate keeps them independent of the client runtime.

mod frame;
mod request;
mod response;

pub use frame::{encode_frame, FrameBuffer, FrameError, FRAME_TERMINATOR};
pub use request::{
    format_fade_time, Body, Command, CommandKind, CommuniqueKind, DimmedLevelParameters,
    FanSpeedParameters, Parameter, Request, RequestHeader, RequestKind,
};
pub use response::{
    ExceptionInfo, PingInfo, Response, ResponseBody, ResponseHeader, SigningResult, StatusInfo,
    STATUS_OK,
};
