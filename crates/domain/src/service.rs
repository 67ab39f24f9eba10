//! Service — a callable command directed at an entity.
//!
//! Service calls arrive as a name plus loosely-typed JSON data. They are
//! parsed into a typed command here so integrations never see raw JSON.

use serde_json::Value;

use crate::cover::SupportedFeatures;

pub const ATTR_POSITION: &str = "position";
pub const ATTR_TILT_POSITION: &str = "tilt_position";

/// Why a service call was refused before reaching the integration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceCallError {
    #[error("unknown service {0:?}")]
    UnknownService(String),

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("field {field:?} must be an integer between 0 and 100")]
    OutOfRange { field: &'static str },

    #[error("service {service:?} is not supported by this entity")]
    NotSupported { service: &'static str },
}

/// A parsed cover command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverService {
    Open,
    Close,
    Stop,
    /// Target position, 0 = closed, 100 = open.
    SetPosition(u8),
    OpenTilt,
    CloseTilt,
    StopTilt,
    SetTiltPosition(u8),
}

impl CoverService {
    /// Parse a service name and its data.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCallError::UnknownService`] for names outside the
    /// cover domain, or a field error when a required position is missing
    /// or outside `0..=100`.
    pub fn parse(service: &str, data: &Value) -> Result<Self, ServiceCallError> {
        match service {
            "open_cover" => Ok(Self::Open),
            "close_cover" => Ok(Self::Close),
            "stop_cover" => Ok(Self::Stop),
            "set_cover_position" => position_field(data, ATTR_POSITION).map(Self::SetPosition),
            "open_cover_tilt" => Ok(Self::OpenTilt),
            "close_cover_tilt" => Ok(Self::CloseTilt),
            "stop_cover_tilt" => Ok(Self::StopTilt),
            "set_cover_tilt_position" => {
                position_field(data, ATTR_TILT_POSITION).map(Self::SetTiltPosition)
            }
            other => Err(ServiceCallError::UnknownService(other.to_string())),
        }
    }

    /// Service name as used in calls.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "open_cover",
            Self::Close => "close_cover",
            Self::Stop => "stop_cover",
            Self::SetPosition(_) => "set_cover_position",
            Self::OpenTilt => "open_cover_tilt",
            Self::CloseTilt => "close_cover_tilt",
            Self::StopTilt => "stop_cover_tilt",
            Self::SetTiltPosition(_) => "set_cover_tilt_position",
        }
    }

    /// The feature flag an entity must advertise to accept this command.
    #[must_use]
    pub fn required_feature(self) -> SupportedFeatures {
        match self {
            Self::Open => SupportedFeatures::OPEN,
            Self::Close => SupportedFeatures::CLOSE,
            Self::Stop => SupportedFeatures::STOP,
            Self::SetPosition(_) => SupportedFeatures::SET_POSITION,
            Self::OpenTilt => SupportedFeatures::OPEN_TILT,
            Self::CloseTilt => SupportedFeatures::CLOSE_TILT,
            Self::StopTilt => SupportedFeatures::STOP_TILT,
            Self::SetTiltPosition(_) => SupportedFeatures::SET_TILT_POSITION,
        }
    }

    /// Refuse the command unless `features` advertises it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceCallError::NotSupported`] when the required flag is missing.
    pub fn ensure_supported(self, features: SupportedFeatures) -> Result<Self, ServiceCallError> {
        if features.contains(self.required_feature()) {
            Ok(self)
        } else {
            Err(ServiceCallError::NotSupported {
                service: self.name(),
            })
        }
    }
}

fn position_field(data: &Value, field: &'static str) -> Result<u8, ServiceCallError> {
    let value = data.get(field).ok_or(ServiceCallError::MissingField(field))?;
    value
        .as_u64()
        .filter(|v| *v <= 100)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or(ServiceCallError::OutOfRange { field })
}
