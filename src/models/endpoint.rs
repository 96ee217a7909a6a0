//! Static catalog of lookup endpoints.
//!
//! Each descriptor names one route of the external lookup API together with the
//! single query parameter it takes. The set is fixed at compile time.

use serde::Serialize;

/// One entry of the lookup menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
    /// Menu label
    pub name: &'static str,

    /// Path suffix appended to the lookup base URL (e.g. `/mobile`)
    pub endpoint: &'static str,

    /// Query parameter carrying the user's input
    pub param: &'static str,

    /// Menu icon
    pub icon: &'static str,
}

const fn descriptor(
    name: &'static str,
    endpoint: &'static str,
    param: &'static str,
    icon: &'static str,
) -> EndpointDescriptor {
    EndpointDescriptor {
        name,
        endpoint,
        param,
        icon,
    }
}

/// The lookup menu, in display order.
pub static ENDPOINTS: [EndpointDescriptor; 12] = [
    descriptor("Mobile Lookup", "/mobile", "number", "📱"),
    descriptor("Aadhaar Lookup", "/aadhaar", "id", "🆔"),
    descriptor("Email Lookup", "/email", "address", "📧"),
    descriptor("GST Lookup", "/gst", "number", "🏢"),
    descriptor("Telegram Lookup", "/telegram", "user", "✈️"),
    descriptor("IFSC Lookup", "/ifsc", "code", "🏦"),
    descriptor("Ration Card Lookup", "/rashan", "aadhaar", "🪪"),
    descriptor("UPI Lookup", "/upi", "id", "💳"),
    descriptor("UPI Lookup v2", "/upi2", "id", "💰"),
    descriptor("Vehicle Lookup", "/vehicle", "registration", "🚗"),
    descriptor("General Query", "/v2", "query", "🔍"),
    descriptor("PAN Lookup", "/pan", "pan", "📋"),
];

/// Find a descriptor by its path suffix.
pub fn find_endpoint(path: &str) -> Option<&'static EndpointDescriptor> {
    ENDPOINTS.iter().find(|e| e.endpoint == path)
}
