//! Hook request URL construction
//!
//! Paths in hook declarations may already be escaped for the destination
//! server, so they are copied into the URL byte-for-byte. Only a single
//! leading `/` is dropped, since the join supplies the separator.

/// Join host and port, bracketing IPv6 literals (`[::1]:8080`)
pub fn join_host_port(host: &str, port: i32) -> String {
    if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Build `scheme://host:port/path` without re-encoding `path`
pub fn format_url(scheme: &str, host: &str, port: i32, path: &str) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}://{}/{}", scheme, join_host_port(host, port), path)
}
