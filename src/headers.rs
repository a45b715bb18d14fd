use crate::session::WynkSession;
use crate::types::ByteRange;
use http_client::Request;

/// User agent sent with every request
const USER_AGENT: &str = concat!("wynk-client/", env!("CARGO_PKG_VERSION"));

/// Add headers shared by all requests
pub fn add_common_headers(request: &mut Request) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept-Language", "en-US,en;q=0.9");
}

/// Add headers for requests that send and expect JSON
pub fn add_json_headers(request: &mut Request) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", "application/json");
    let _ = request.insert_header("Content-Type", "application/json");
}

/// Add headers for the audio stream request
pub fn add_stream_headers(request: &mut Request, range: ByteRange) {
    add_common_headers(request);
    let _ = request.insert_header("Accept", "audio/*, */*;q=0.5");
    let _ = request.insert_header("Range", range.header_value());
}

/// Add the bearer token of the session
pub fn add_auth(request: &mut Request, session: &WynkSession) {
    let _ = request.insert_header("Authorization", session.bearer());
}
