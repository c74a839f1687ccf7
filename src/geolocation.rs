//! Current-position capability
//!
//! A lookup "from here" needs something that can report where here is. In the
//! browser that is the page's geolocation API, whose answer reaches the server
//! as query parameters; on the command line it is a position given as flags or
//! in the config file. When no capability exists at all, callers pass `None`.

use crate::models::Coordinates;
use crate::{Result, WidgetError};
use async_trait::async_trait;

/// Something that can report the user's current position
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates>;
}

/// A position report that is already known
#[derive(Debug, Clone, PartialEq)]
pub enum ReportedPosition {
    Position(Coordinates),
    /// The user refused the permission prompt
    Denied,
    /// The capability exists but could not produce a position
    Unavailable(String),
    /// The capability gave up waiting for a fix
    TimedOut,
}

#[async_trait]
impl Geolocator for ReportedPosition {
    async fn current_position(&self) -> Result<Coordinates> {
        match self {
            ReportedPosition::Position(coordinates) => Ok(*coordinates),
            ReportedPosition::Denied => Err(WidgetError::GeolocationDenied),
            ReportedPosition::Unavailable(reason) => {
                Err(WidgetError::geolocation_unavailable(reason.clone()))
            }
            ReportedPosition::TimedOut => Err(WidgetError::GeolocationTimeout),
        }
    }
}
