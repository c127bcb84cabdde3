use serde::{Deserialize, Serialize};

/// Outcome of the three liveness probes for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub domain: String,
    /// The site answered over TLS at all (any status code).
    pub https: bool,
    /// The first hop answered with a 3xx.
    pub redirected: bool,
    pub indexable: bool,
    pub domain_age: Option<String>,
}

impl ProbeReport {
    pub fn new(domain: String) -> Self {
        Self {
            domain,
            https: true,
            redirected: false,
            indexable: true,
            domain_age: None,
        }
    }

    /// The fail-closed report used when nothing about the site could be observed.
    pub fn unreachable(domain: String) -> Self {
        Self {
            domain,
            https: false,
            redirected: false,
            indexable: false,
            domain_age: None,
        }
    }
}
