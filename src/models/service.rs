// SPDX-License-Identifier: MIT

//! Service kinds and per-user service records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The closed set of renewable Absher services.
///
/// Every site that branches on a service kind matches exhaustively, so a new
/// kind cannot be silently mishandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/lib/generated/")
)]
pub enum ServiceKind {
    NationalId,
    DriverLicense,
    Passport,
    VehicleRegistration,
}

impl ServiceKind {
    /// All kinds, in display order.
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::NationalId,
        ServiceKind::DriverLicense,
        ServiceKind::Passport,
        ServiceKind::VehicleRegistration,
    ];

    /// Wire name used in API payloads and notification metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::NationalId => "national_id",
            ServiceKind::DriverLicense => "driver_license",
            ServiceKind::Passport => "passport",
            ServiceKind::VehicleRegistration => "vehicle_registration",
        }
    }

    /// Human label shown in messages ("Driver License" etc).
    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::NationalId => "National ID",
            ServiceKind::DriverLicense => "Driver License",
            ServiceKind::Passport => "Passport",
            ServiceKind::VehicleRegistration => "Vehicle Registration",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = UnknownServiceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "national_id" => Ok(ServiceKind::NationalId),
            "driver_license" => Ok(ServiceKind::DriverLicense),
            "passport" => Ok(ServiceKind::Passport),
            "vehicle_registration" => Ok(ServiceKind::VehicleRegistration),
            other => Err(UnknownServiceKind(other.to_string())),
        }
    }
}

/// Error for a service-kind string outside the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown service kind: {0}")]
pub struct UnknownServiceKind(pub String);

/// One tracked service belonging to a session user.
///
/// `expiry_date` is `None` when the service is not tracked for this user.
/// The expiry is mutated only by the renewal apply step, and only forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub service_type: ServiceKind,
    /// Human label ("National ID"). Template data may override the default.
    pub service_name: String,
    /// Expiry timestamp; naive values in template data are read as UTC.
    #[serde(default, with = "crate::time_utils::flexible_utc_option")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl ServiceRecord {
    pub fn new(kind: ServiceKind, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            service_type: kind,
            service_name: kind.label().to_string(),
            expiry_date: expiry,
        }
    }
}
