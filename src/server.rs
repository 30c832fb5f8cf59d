//! HTTP front door.
//!
//! Routing is a plain function from `(method, url, body)` to a [`Reply`];
//! the tiny_http loop only reads bodies and writes replies back.

use log::{error, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Cursor, Read};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::catalog;
use crate::config::{DatapackPayload, RawInput};
use crate::normalize::{normalize_payload, parse_payload};
use crate::packager;
use crate::settings::Settings;
use crate::templates::{build_ability_function, build_give_command, build_load_function};
use crate::{ForgeError, ForgeResult};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Response produced by [`route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", TEXT_PLAIN.to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status: 200,
                headers: vec![("Content-Type", APPLICATION_JSON.to_string())],
                body,
            },
            Err(err) => {
                error!("[Server] Failed to encode response: {}", err);
                Self::text(500, "Internal server error")
            }
        }
    }

    fn archive(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type", "application/zip".to_string()),
                (
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", file_name),
                ),
                ("Cache-Control", "no-store".to_string()),
            ],
            body: bytes,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let Reply {
            status,
            headers,
            body,
        } = self;
        let mut response = Response::from_data(body).with_status_code(status);
        for (name, value) in headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => warn!("[Server] Dropping invalid header {}: {}", name, value),
            }
        }
        response
    }
}

/// Live preview of the generated text, identical to what gets packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub namespace: String,
    pub give_command: String,
    pub ability_function: String,
    pub load_function: String,
}

impl Preview {
    pub fn render(payload: &DatapackPayload) -> Self {
        Self {
            namespace: payload.namespace.clone(),
            give_command: build_give_command(&payload.config, &payload.namespace),
            ability_function: build_ability_function(&payload.config),
            load_function: build_load_function(&payload.namespace, &payload.config),
        }
    }
}

/// Query string as a raw record; every value arrives as a string.
fn parse_query(query: &str) -> RawInput {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(&key.replace('+', " ")).ok()?.into_owned();
            let value = urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned();
            Some((key, Value::String(value)))
        })
        .collect()
}

fn read_payload(body: &[u8]) -> Result<RawInput, Reply> {
    parse_payload(body).map_err(|err| {
        warn!("[Server] Rejected payload: {}", err);
        Reply::text(400, "Missing payload")
    })
}

fn handle_datapack(body: &[u8]) -> Reply {
    let raw = match read_payload(body) {
        Ok(raw) => raw,
        Err(reply) => return reply,
    };
    let payload = normalize_payload(&raw);
    match packager::package(&payload) {
        Ok((file_name, bytes)) => Reply::archive(&file_name, bytes),
        Err(err) => {
            error!("[Server] Datapack generation failed: {}", err);
            Reply::text(500, "Failed to generate datapack")
        }
    }
}

fn handle_preview(raw: &RawInput) -> Reply {
    Reply::json(&Preview::render(&normalize_payload(raw)))
}

pub fn route(method: &Method, url: &str, body: &[u8]) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    match (method, path) {
        (Method::Post, "/api/datapack") => handle_datapack(body),
        (Method::Post, "/api/preview") => match read_payload(body) {
            Ok(raw) => handle_preview(&raw),
            Err(reply) => reply,
        },
        (Method::Get, "/api/preview") => handle_preview(&parse_query(query)),
        (Method::Get, "/api/catalog") => Reply::json(&catalog::listing()),
        (Method::Get, "/health") => Reply::text(200, "ok"),
        (_, "/api/datapack" | "/api/preview" | "/api/catalog" | "/health") => {
            Reply::text(405, "Method not allowed")
        }
        _ => Reply::text(404, "Not found"),
    }
}

/// Reads at most `limit` bytes; `None` when the body is larger.
fn read_body(reader: impl Read, limit: usize) -> io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(limit as u64 + 1).read_to_end(&mut body)?;
    Ok((body.len() <= limit).then_some(body))
}

fn handle_request(mut request: Request, max_body_bytes: usize) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let reply = match read_body(request.as_reader(), max_body_bytes) {
        Ok(Some(body)) => route(&method, &url, &body),
        Ok(None) => Reply::text(413, "Payload too large"),
        Err(err) => {
            warn!("[Server] Failed to read body: {}", err);
            Reply::text(400, "Missing payload")
        }
    };

    info!("[Server] {} {} -> {}", method, url, reply.status);
    if let Err(err) = request.respond(reply.into_response()) {
        warn!("[Server] Failed to send response: {}", err);
    }
}

/// Serves requests until the listener shuts down.
pub fn serve(settings: &Settings) -> ForgeResult<()> {
    let address = settings.bind_address();
    let server = Server::http(&address).map_err(|err| ForgeError::Server(err.to_string()))?;
    let url = format!("http://{}", address);
    info!("[Server] Listening on {}", url);

    if settings.open_browser {
        if let Err(err) = open::that(&url) {
            warn!("[Server] Could not open browser: {}", err);
        }
    }

    for request in server.incoming_requests() {
        handle_request(request, settings.max_body_bytes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(path: &str, body: &str) -> Reply {
        route(&Method::Post, path, body.as_bytes())
    }

    fn body_json(reply: &Reply) -> Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn test_datapack_returns_archive() {
        let reply = post(
            "/api/datapack",
            r#"{"modName": "Emerald Arsenal", "itemName": "Emerald Saber"}"#,
        );
        assert_eq!(reply.status, 200);
        assert_eq!(reply.header("content-type"), Some("application/zip"));
        assert_eq!(
            reply.header("Content-Disposition"),
            Some("attachment; filename=\"emerald_arsenal-datapack.zip\"")
        );
        assert_eq!(reply.header("Cache-Control"), Some("no-store"));
        assert!(reply.body.starts_with(b"PK"));
    }

    #[test]
    fn test_datapack_missing_payload() {
        for body in ["", "null", "{broken", "false", "0", r#""""#] {
            let reply = post("/api/datapack", body);
            assert_eq!(reply.status, 400, "body {:?}", body);
            assert_eq!(reply.body, b"Missing payload");
        }
    }

    #[test]
    fn test_datapack_empty_object_uses_defaults() {
        let reply = post("/api/datapack", "{}");
        assert_eq!(reply.status, 200);
        assert_eq!(
            reply.header("Content-Disposition"),
            Some("attachment; filename=\"custom_arsenal-datapack.zip\"")
        );
    }

    #[test]
    fn test_post_preview_matches_builders() {
        let raw = json!({
            "modName": "Emerald Arsenal",
            "abilityEffect": "night_vision",
            "abilityAmplifier": 4
        });
        let reply = post("/api/preview", &raw.to_string());
        assert_eq!(reply.status, 200);

        let payload = normalize_payload(raw.as_object().unwrap());
        let preview = body_json(&reply);
        assert_eq!(preview["namespace"], "emerald_arsenal");
        assert_eq!(
            preview["giveCommand"],
            build_give_command(&payload.config, "emerald_arsenal")
        );
        assert_eq!(
            preview["abilityFunction"],
            build_ability_function(&payload.config)
        );
        assert!(preview["abilityFunction"]
            .as_str()
            .unwrap()
            .ends_with("night_vision 12 0 true"));
    }

    #[test]
    fn test_get_preview_reads_query() {
        let reply = route(
            &Method::Get,
            "/api/preview?modName=Storm+Pack&itemName=Bolt%20%22Prime%22&abilityDuration=30",
            b"",
        );
        assert_eq!(reply.status, 200);
        let preview = body_json(&reply);
        assert_eq!(preview["namespace"], "storm_pack");
        assert!(preview["loadFunction"]
            .as_str()
            .unwrap()
            .contains(r#"claim the Bolt \"Prime\"."#));
        assert!(preview["abilityFunction"]
            .as_str()
            .unwrap()
            .ends_with("strength 30 0 true"));
    }

    #[test]
    fn test_catalog_listing() {
        let reply = route(&Method::Get, "/api/catalog", b"");
        assert_eq!(reply.status, 200);
        let listing = body_json(&reply);
        assert_eq!(listing["baseItems"][1]["value"], "netherite_sword");
        assert_eq!(listing["abilityEffects"][3]["supportsAmplifier"], false);
    }

    #[test]
    fn test_unknown_routes() {
        assert_eq!(route(&Method::Get, "/nope", b"").status, 404);
        assert_eq!(route(&Method::Get, "/api/datapack", b"").status, 405);
        assert_eq!(route(&Method::Delete, "/api/catalog", b"").status, 405);
        assert_eq!(route(&Method::Get, "/health", b"").body, b"ok");
    }

    #[test]
    fn test_read_body_limit_boundaries() {
        let exact = read_body(Cursor::new(vec![b'x'; 16]), 16).unwrap();
        assert_eq!(exact, Some(vec![b'x'; 16]));

        assert_eq!(read_body(Cursor::new(vec![b'x'; 17]), 16).unwrap(), None);
        assert_eq!(read_body(Cursor::new(Vec::new()), 16).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_parse_query_decodes_pairs() {
        let raw = parse_query("a=1&b=two+words&&c&d=%E2%9C%93");
        assert_eq!(raw.get("a"), Some(&json!("1")));
        assert_eq!(raw.get("b"), Some(&json!("two words")));
        assert_eq!(raw.get("c"), Some(&json!("")));
        assert_eq!(raw.get("d"), Some(&json!("✓")));
    }
}
