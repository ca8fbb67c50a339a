// SPDX-License-Identifier: MIT

//! Official renewal fee lookup.
//!
//! Fixed table; in a real deployment this would call the fee microservice.
//! Fees are always computed here, server-side. Client-supplied amounts are
//! never trusted.

use crate::models::ServiceKind;

/// Fallback fee for a service named outside the closed kind set.
pub const DEFAULT_FEE_SAR: f64 = 150.0;

/// Currency for all fees.
pub const CURRENCY: &str = "SAR";

/// Official renewal fee for a service kind, in SAR.
pub fn service_fee(kind: ServiceKind) -> f64 {
    match kind {
        ServiceKind::NationalId => 150.0,
        ServiceKind::DriverLicense => 80.0,
        ServiceKind::Passport => 164.0,
        ServiceKind::VehicleRegistration => 100.0,
    }
}

/// Fee for a raw service label, falling back to [`DEFAULT_FEE_SAR`] when the
/// label is not a known kind.
pub fn fee_for_label(label: &str) -> f64 {
    label
        .parse::<ServiceKind>()
        .map(service_fee)
        .unwrap_or(DEFAULT_FEE_SAR)
}
