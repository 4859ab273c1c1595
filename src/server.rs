use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::{load_races, render_page, EmbedStore, SaveRequest};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_interrupt_handler() {
    extern "C" fn handle_interrupt(_sig: libc::c_int) {
        SHUTDOWN.store(true, Ordering::SeqCst);
    }
    unsafe {
        libc::signal(
            libc::SIGINT,
            handle_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
        libc::signal(
            libc::SIGTERM,
            handle_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t,
        );
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler() {}

/// Sequential request loop. One request at a time, blocking file I/O per
/// request, nothing carried over in memory between requests. The loop polls
/// so an interrupt can stop it between requests.
pub(crate) fn run_server(
    bind: &str,
    port: u16,
    races_path: &Path,
    store: &EmbedStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{bind}:{port}");
    let server = Server::http(&addr)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("server: {e}")))?;
    install_interrupt_handler();
    eprintln!("Embed collector listening on http://{addr}");

    while !SHUTDOWN.load(Ordering::SeqCst) {
        let request = match server.recv_timeout(Duration::from_millis(250)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                if SHUTDOWN.load(Ordering::SeqCst) {
                    break;
                }
                eprintln!("recv: {e}");
                continue;
            }
        };
        handle_request(request, races_path, store);
    }

    eprintln!("Server stopped. Goodbye!");
    Ok(())
}

fn handle_request(mut request: Request, races_path: &Path, store: &EmbedStore) {
    let url = request.url().to_string();
    let path = url.splitn(2, '?').next().unwrap_or("/").to_string();

    let response = match (request.method().clone(), path.as_str()) {
        (Method::Get, "/") | (Method::Get, "/index.html") => match render_index(races_path, store) {
            Ok(html) => with_content_type(Response::from_string(html), "text/html; charset=utf-8"),
            Err(e) => {
                eprintln!("render failed: {e}");
                with_content_type(
                    Response::from_string(format!("render failed: {e}")),
                    "text/plain; charset=utf-8",
                )
                .with_status_code(StatusCode(500))
            }
        },
        (Method::Get, _) => serve_static(&path).unwrap_or_else(empty_not_found),
        (Method::Post, "/save") => handle_save(&mut request, store),
        _ => empty_not_found(),
    };
    let _ = request.respond(response);
}

fn render_index(
    races_path: &Path,
    store: &EmbedStore,
) -> Result<String, Box<dyn std::error::Error>> {
    // Both files are re-read per request so catalog edits and external store
    // edits show up on refresh.
    let races = load_races(races_path)?;
    let embeds = store.load()?;
    Ok(render_page(&races, &embeds))
}

fn handle_save(request: &mut Request, store: &EmbedStore) -> Response<io::Cursor<Vec<u8>>> {
    let mut body = String::new();
    if request.as_reader().read_to_string(&mut body).is_err() {
        return json_response(400, serde_json::json!({"success": false, "error": "Invalid request body"}));
    }

    match parse_save_request(&body) {
        Ok((activity_id, embed_url)) => match store.upsert(&activity_id, &embed_url) {
            Ok(()) => json_response(200, serde_json::json!({"success": true})),
            Err(e) => {
                eprintln!("save failed: {e}");
                json_response(
                    500,
                    serde_json::json!({"success": false, "error": format!("save failed: {e}")}),
                )
            }
        },
        Err(message) => {
            json_response(400, serde_json::json!({"success": false, "error": message}))
        }
    }
}

/// Validate a POST /save body. Malformed JSON and missing/blank fields are
/// both rejected here, before anything touches the store.
pub(crate) fn parse_save_request(body: &str) -> Result<(String, String), &'static str> {
    let save: SaveRequest = serde_json::from_str(body).map_err(|_| "Invalid request body")?;
    let activity_id = save.activity_id.trim();
    let embed_url = save.embed_url.trim();
    if activity_id.is_empty() || embed_url.is_empty() {
        return Err("Missing data");
    }
    Ok((activity_id.to_string(), embed_url.to_string()))
}

fn serve_static(url_path: &str) -> Option<Response<io::Cursor<Vec<u8>>>> {
    let relative = resolve_static_path(url_path)?;
    let bytes = fs::read(&relative).ok()?;
    Some(with_content_type(
        Response::from_data(bytes),
        content_type_for(url_path),
    ))
}

/// Map a request path onto a file path relative to the working directory.
/// Anything that is not a plain descending relative path is refused.
pub(crate) fn resolve_static_path(url_path: &str) -> Option<PathBuf> {
    let trimmed = url_path.strip_prefix('/')?;
    if trimmed.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(trimmed).ok()?;
    if decoded.contains('\0') {
        return None;
    }
    let relative = PathBuf::from(decoded.into_owned());
    if !relative
        .components()
        .all(|part| matches!(part, Component::Normal(_)))
    {
        return None;
    }
    Some(relative)
}

pub(crate) fn content_type_for(path: &str) -> &'static str {
    let path = path.to_ascii_lowercase();
    if path.ends_with(".html") || path.ends_with(".htm") {
        return "text/html; charset=utf-8";
    }
    if path.ends_with(".css") {
        return "text/css; charset=utf-8";
    }
    if path.ends_with(".js") {
        return "text/javascript; charset=utf-8";
    }
    if path.ends_with(".json") {
        return "application/json";
    }
    if path.ends_with(".png") {
        return "image/png";
    }
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        return "image/jpeg";
    }
    if path.ends_with(".webp") {
        return "image/webp";
    }
    if path.ends_with(".gif") {
        return "image/gif";
    }
    if path.ends_with(".svg") {
        return "image/svg+xml";
    }
    if path.ends_with(".ico") {
        return "image/x-icon";
    }
    if path.ends_with(".txt") {
        return "text/plain; charset=utf-8";
    }
    "application/octet-stream"
}

fn json_response(status: u16, value: serde_json::Value) -> Response<io::Cursor<Vec<u8>>> {
    with_content_type(Response::from_string(value.to_string()), "application/json")
        .with_status_code(StatusCode(status))
}

fn empty_not_found() -> Response<io::Cursor<Vec<u8>>> {
    Response::from_string("").with_status_code(StatusCode(404))
}

fn with_content_type(
    response: Response<io::Cursor<Vec<u8>>>,
    value: &str,
) -> Response<io::Cursor<Vec<u8>>> {
    match Header::from_bytes("Content-Type", value) {
        Ok(header) => response.with_header(header),
        Err(_) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_accepts_complete_body() {
        let parsed =
            parse_save_request(r#"{"activity_id": "111", "embed_url": "<iframe x>"}"#).unwrap();
        assert_eq!(parsed, ("111".to_string(), "<iframe x>".to_string()));
    }

    #[test]
    fn save_request_trims_fields() {
        let parsed =
            parse_save_request(r#"{"activity_id": " 111 ", "embed_url": " e "}"#).unwrap();
        assert_eq!(parsed, ("111".to_string(), "e".to_string()));
    }

    #[test]
    fn save_request_rejects_missing_embed_url() {
        assert_eq!(
            parse_save_request(r#"{"activity_id": "111"}"#),
            Err("Missing data")
        );
    }

    #[test]
    fn save_request_rejects_missing_activity_id() {
        assert_eq!(
            parse_save_request(r#"{"embed_url": "<iframe x>"}"#),
            Err("Missing data")
        );
    }

    #[test]
    fn save_request_rejects_blank_fields() {
        assert_eq!(
            parse_save_request(r#"{"activity_id": "  ", "embed_url": "x"}"#),
            Err("Missing data")
        );
    }

    #[test]
    fn save_request_rejects_malformed_json() {
        assert_eq!(parse_save_request("not json"), Err("Invalid request body"));
    }

    #[test]
    fn static_path_resolves_plain_files() {
        assert_eq!(
            resolve_static_path("/public/races-data.json"),
            Some(PathBuf::from("public/races-data.json"))
        );
        assert_eq!(resolve_static_path("/style.css"), Some(PathBuf::from("style.css")));
    }

    #[test]
    fn static_path_decodes_percent_encoding() {
        assert_eq!(
            resolve_static_path("/my%20file.txt"),
            Some(PathBuf::from("my file.txt"))
        );
    }

    #[test]
    fn static_path_rejects_traversal() {
        assert_eq!(resolve_static_path("/../etc/passwd"), None);
        assert_eq!(resolve_static_path("/a/../../b"), None);
        assert_eq!(resolve_static_path("/%2e%2e/secret"), None);
        assert_eq!(resolve_static_path("//etc/passwd"), None);
    }

    #[test]
    fn static_path_rejects_root() {
        assert_eq!(resolve_static_path("/"), None);
        assert_eq!(resolve_static_path(""), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for("/index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("/app.JS"), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for("/races-data.json"), "application/json");
        assert_eq!(content_type_for("/logo.png"), "image/png");
        assert_eq!(content_type_for("/mystery.bin"), "application/octet-stream");
    }
}
