//! Scheme and default-port compatibility for HTTP GET hooks
//!
//! Before the `LifecycleHandlerHTTPS` gate existed, every HTTP GET hook was
//! sent as plain HTTP and an empty port defaulted to 80, whatever scheme the
//! hook declared. With the gate disabled that behavior is kept exactly; with
//! it enabled the declared scheme is honored and HTTPS defaults to 443.
//!
//! | gate  | declared | effective | default port |
//! |-------|----------|-----------|--------------|
//! | off   | any      | HTTP      | 80           |
//! | on    | HTTP     | HTTP      | 80           |
//! | on    | HTTPS    | HTTPS     | 443          |

use crate::hook::UriScheme;

/// Default ports used when a hook leaves its port empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPorts {
    pub http: i32,
    pub https: i32,
}

impl Default for DefaultPorts {
    fn default() -> Self {
        Self {
            http: 80,
            https: 443,
        }
    }
}

impl DefaultPorts {
    pub fn for_scheme(&self, scheme: UriScheme) -> i32 {
        match scheme {
            UriScheme::Http => self.http,
            UriScheme::Https => self.https,
        }
    }
}

/// Scheme and default port an HTTP GET hook is actually sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveTarget {
    pub scheme: UriScheme,
    /// Used only when the hook's port specification is empty
    pub default_port: i32,
}

/// Derive the effective scheme and default port for a declared scheme
pub fn resolve_scheme(
    declared: UriScheme,
    gate_enabled: bool,
    defaults: DefaultPorts,
) -> EffectiveTarget {
    let scheme = if gate_enabled {
        declared
    } else {
        UriScheme::Http
    };
    EffectiveTarget {
        scheme,
        default_port: defaults.for_scheme(scheme),
    }
}
