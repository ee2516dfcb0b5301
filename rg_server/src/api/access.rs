//! Access check endpoint.

use axum::{Json, extract::State};
use reaction_gate::{PublicStatus, ValidationResult};

use super::{AppState, client_ip::RequestMeta};
use crate::{logging, metrics};

/// Run the access checks for the calling client.
///
/// # Response
///
/// Always `200 OK`; only the three booleans are exposed:
/// ```json
/// { "hasAccess": false, "publicStatus": { "location": true, "device": false, "security": true } }
/// ```
pub async fn check_access(
    State(state): State<AppState>,
    meta: RequestMeta,
) -> Json<ValidationResult> {
    let result = state.validator.validate(meta.request()).await;
    record_access_decision(meta.ip(), &result.public_status);
    Json(result)
}

pub(crate) fn record_access_decision(ip: &str, status: &PublicStatus) {
    let granted = status.all_passed();
    metrics::access_decisions_total(granted);

    if !status.location {
        metrics::access_checks_failed_total("location");
    }
    if !status.device {
        metrics::access_checks_failed_total("device");
    }
    if !status.security {
        metrics::access_checks_failed_total("security");
        logging::log_security_event("automation_client", ip, "Automated user agent rejected");
    }

    logging::log_access_decision(ip, status.location, status.device, status.security);
}
