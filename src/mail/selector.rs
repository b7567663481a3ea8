//! Service selection policy
//!
//! Pick the outbound service for a request, in order: explicit `service`
//! name, recipient-domain heuristic against known consumer providers,
//! uniform random fallback. The random source is passed in so tests can
//! seed it.

use crate::domain::{SendRequest, ServiceConfig};
use crate::error::SendError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Consumer mail domains with a conventionally named tuned service.
const PROVIDER_DOMAINS: &[(&str, &str)] = &[("@qq.com", "qq"), ("@gmail.com", "gmail")];

/// Select the service configuration for a request.
///
/// The mapping is validated non-empty at startup; an empty mapping here is
/// reported as an error rather than a panic.
pub fn select_config<'a, R: Rng + ?Sized>(
    request: &SendRequest,
    configs: &'a HashMap<String, ServiceConfig>,
    rng: &mut R,
) -> Result<(&'a str, &'a ServiceConfig), SendError> {
    if let Some(service) = request.service.as_deref() {
        if let Some((name, config)) = configs.get_key_value(service) {
            return Ok((name.as_str(), config));
        }
    }

    for (domain, service) in PROVIDER_DOMAINS {
        if request.user.ends_with(domain) {
            if let Some((name, config)) = configs.get_key_value(*service) {
                return Ok((name.as_str(), config));
            }
        }
    }

    // Uniform random over a stable ordering of the names.
    let mut names: Vec<&String> = configs.keys().collect();
    names.sort();
    let name = names.choose(rng).ok_or(SendError::NoServices)?;

    Ok((name.as_str(), &configs[name.as_str()]))
}
