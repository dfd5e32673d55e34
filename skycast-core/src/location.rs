use async_trait::async_trait;

use crate::model::Coord;

/// Outcome of a location permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Access to the hosting platform's positioning facility.
///
/// Both calls are best-effort: the search surface treats a denied permission
/// or an unknown position as "no location", never as an error.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn check_permission(&self) -> Permission;

    /// The most recent known device position, if the platform has one.
    async fn last_known_location(&self) -> Option<Coord>;
}

/// Fixed-answer provider: the CLI backs it with configured home
/// coordinates, and tests use it to script the location flow.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation {
    permission: Permission,
    position: Option<Coord>,
}

impl StaticLocation {
    pub fn granted(lat: f64, lon: f64) -> Self {
        Self {
            permission: Permission::Granted,
            position: Some(Coord { lat, lon }),
        }
    }

    pub fn granted_without_position() -> Self {
        Self {
            permission: Permission::Granted,
            position: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
            position: None,
        }
    }
}

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn check_permission(&self) -> Permission {
        self.permission
    }

    async fn last_known_location(&self) -> Option<Coord> {
        self.position
    }
}
