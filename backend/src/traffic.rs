use actix_web::HttpRequest;
use log::warn;

/// Audit entry for a request that was deliberately denied, such as a
/// probe against a hidden table. Purely a log write; it must never fail
/// or alter the response being built.
pub fn log_blocked_request(req: &HttpRequest, status: u16) {
    let peer = req
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    let agent = req
        .headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    warn!(
        "blocked request: status={} peer={} {} {} agent={:?}",
        status,
        peer,
        req.method(),
        req.path(),
        agent
    );
}
