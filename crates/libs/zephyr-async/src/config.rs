use crate::message::BodyEncoding;
use crate::notice::AuthMode;

/// Client configuration, fixed for the lifetime of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZephyrConfig {
    /// Preferred local port; 0 lets the port library pick.
    pub preferred_port: u16,
    /// Active body convention for both decode and encode.
    pub encoding: BodyEncoding,
    /// Authentication applied to outgoing notices.
    pub auth: AuthMode,
}
