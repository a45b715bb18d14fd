#![allow(dead_code)]
//! In-process stand-in for the Wynk API, plugged in as the client's `HttpClient`.

use http_client::{Error, HttpClient, Request, Response};
use http_types::{Method, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wynk_client::{
    ClientConfig, MemorySessionStore, Playlist, Role, Song, WynkClientImpl, WynkSession,
};

pub const BASE_URL: &str = "http://wynk.test";
pub const AUDIO: &[u8] = b"ID3\x03\x00\x00\x00fake-mp3-frames";

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<(Role, String), String>,
    tokens: HashMap<String, (String, Role)>,
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
    next_song_id: i64,
    next_playlist_id: i64,
    next_token: u64,
    offline: bool,
    offline_after: Option<usize>,
    gateway_error: bool,
    partial_content: bool,
    requests: Vec<String>,
    uploads: Vec<HashMap<String, String>>,
}

/// A fake Wynk server keeping its data in memory.
///
/// Clones share state, so a test can keep one handle for assertions and give
/// another to the client.
#[derive(Debug, Clone, Default)]
pub struct FakeWynk {
    state: Arc<Mutex<State>>,
}

impl FakeWynk {
    pub fn new() -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            state.next_song_id = 1;
            state.next_playlist_id = 1;
            state.partial_content = true;
        }
        fake
    }

    /// Songs A, B and C, playlists P1 = {A} and P2 = {B} owned by `alice`.
    pub fn with_library() -> Self {
        let fake = Self::new();
        fake.add_account(Role::Listener, "alice", "pw");
        fake.add_account(Role::Performer, "arijit", "pw");
        fake.add_account(Role::Performer, "shreya", "pw");
        let a = fake.add_song("A", "arijit");
        let b = fake.add_song("B", "arijit");
        fake.add_song("C", "shreya");
        fake.add_playlist("P1", "alice", &[a]);
        fake.add_playlist("P2", "alice", &[b]);
        fake
    }

    pub fn add_account(&self, role: Role, name: &str, password: &str) {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert((role, name.to_string()), password.to_string());
    }

    pub fn add_song(&self, name: &str, singer: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_song_id;
        state.next_song_id += 1;
        state.songs.push(Song {
            id,
            song_name: name.to_string(),
            singer_name: singer.to_string(),
            rating: 0.0,
        });
        id
    }

    pub fn add_playlist(&self, name: &str, owner: &str, song_ids: &[i64]) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_playlist_id;
        state.next_playlist_id += 1;
        let songs = state
            .songs
            .iter()
            .filter(|s| song_ids.contains(&s.id))
            .cloned()
            .collect();
        state.playlists.push(Playlist {
            id,
            playlist_name: name.to_string(),
            user_name: owner.to_string(),
            songs,
        });
        id
    }

    /// Hand out a token without going through the login endpoint.
    pub fn issue_token(&self, name: &str, role: Role) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_token += 1;
        let token = format!("token-{}", state.next_token);
        state.tokens.insert(token.clone(), (name.to_string(), role));
        token
    }

    pub fn revoke_all_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    /// Make every request fail as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Answer the next `requests` requests, then behave as if offline.
    pub fn go_offline_after(&self, requests: usize) {
        self.state.lock().unwrap().offline_after = Some(requests);
    }

    /// Answer every request with a 502 HTML page, as a failing proxy would.
    pub fn set_gateway_error(&self, failing: bool) {
        self.state.lock().unwrap().gateway_error = failing;
    }

    /// Answer ranged stream requests with 206 (default) or 200.
    pub fn set_partial_content(&self, partial: bool) {
        self.state.lock().unwrap().partial_content = partial;
    }

    /// Requests seen so far, as "METHOD /path".
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    /// Text fields of every multipart upload received.
    pub fn uploads(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn song_id(&self, name: &str) -> i64 {
        self.state
            .lock()
            .unwrap()
            .songs
            .iter()
            .find(|s| s.song_name == name)
            .map(|s| s.id)
            .unwrap()
    }

    pub fn playlist_id(&self, name: &str) -> i64 {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.playlist_name == name)
            .map(|p| p.id)
            .unwrap()
    }

    pub fn client(&self) -> WynkClientImpl {
        WynkClientImpl::with_config(
            Box::new(self.clone()),
            ClientConfig::new().with_base_url(BASE_URL),
        )
    }

    /// A client already holding a session for `name`.
    pub fn client_for(&self, name: &str, role: Role) -> (WynkClientImpl, WynkSession) {
        let session = self.session_for(name, role);
        let client = self.client();
        wynk_client::WynkClient::restore_session(&client, session.clone());
        (client, session)
    }

    pub fn session_for(&self, name: &str, role: Role) -> WynkSession {
        WynkSession::new(
            name.to_string(),
            role,
            self.issue_token(name, role),
            BASE_URL.to_string(),
            Duration::from_secs(600),
        )
    }

    /// A memory store holding a fresh session for `name`.
    pub fn store_for(&self, name: &str, role: Role) -> MemorySessionStore {
        let store = MemorySessionStore::new();
        wynk_client::SessionStore::save(&store, &self.session_for(name, role)).unwrap();
        store
    }

    fn handle(&self, method: Method, request: &Request, body: Vec<u8>) -> Response {
        let path = request.url().path().to_string();
        let query: HashMap<String, String> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let bearer = request
            .header("Authorization")
            .and_then(|v| v.as_str().strip_prefix("Bearer ").map(str::to_string));
        let content_type = request
            .header("Content-Type")
            .map(|v| v.as_str().to_string())
            .unwrap_or_default();
        let range = request.header("Range").map(|v| v.as_str().to_string());

        let mut state = self.state.lock().unwrap();
        state.requests.push(format!("{method} {path}"));
        if state.gateway_error {
            let mut response = Response::new(502);
            response.set_body("<html><body>502 Bad Gateway</body></html>");
            let _ = response.insert_header("Content-Type", "text/html");
            return response;
        }

        let segments: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .map(|s| {
                urlencoding::decode(s)
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (method, segments.as_slice()) {
            (Method::Post, ["wynk", "register", kind]) => {
                let role = match *kind {
                    "user" => Role::Listener,
                    "singer" => Role::Performer,
                    _ => return message(404, "Unknown role"),
                };
                let Some((name, password)) = credentials(&body) else {
                    return message(400, "Malformed body");
                };
                if state.accounts.contains_key(&(role, name.clone())) {
                    return message(409, "User already exists");
                }
                state.accounts.insert((role, name), password);
                json_response(201, json!({"message": "Registered"}))
            }
            (Method::Post, ["wynk", "login"]) | (Method::Post, ["wynk", "login", "singer"]) => {
                let role = if segments.len() == 3 {
                    Role::Performer
                } else {
                    Role::Listener
                };
                let Some((name, password)) = credentials(&body) else {
                    return message(400, "Malformed body");
                };
                if state.accounts.get(&(role, name.clone())) != Some(&password) {
                    return message(401, "Invalid credentials");
                }
                state.next_token += 1;
                let token = format!("token-{}", state.next_token);
                state.tokens.insert(token.clone(), (name, role));
                json_response(200, json!({ "token": token }))
            }
            _ => {
                let Some((user, role)) = bearer.and_then(|t| state.tokens.get(&t).cloned())
                else {
                    return message(401, "Unauthorized");
                };
                route_authenticated(
                    &mut state,
                    &method,
                    &segments,
                    &query,
                    &content_type,
                    range,
                    &body,
                    &user,
                    role,
                )
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn route_authenticated(
    state: &mut State,
    method: &Method,
    segments: &[&str],
    query: &HashMap<String, String>,
    content_type: &str,
    range: Option<String>,
    body: &[u8],
    user: &str,
    role: Role,
) -> Response {
    match (method, segments) {
        (Method::Get, ["wynk", "user", "song"]) => json_response(200, json!(state.songs)),
        (Method::Get, ["wynk", "user", "playlist", "getuser", name]) => {
            let playlists: Vec<&Playlist> = state
                .playlists
                .iter()
                .filter(|p| p.user_name == *name)
                .collect();
            json_response(200, json!(playlists))
        }
        (Method::Get, ["wynk", "user", "playlist", id]) => {
            match state.playlists.iter().find(|p| p.id.to_string() == *id) {
                Some(p) => json_response(200, json!({ "id": p.id, "songs": p.songs })),
                None => message(404, "Playlist not found"),
            }
        }
        (Method::Get, ["wynk", "user", "stream", id]) => {
            let Some(song) = state.songs.iter().find(|s| s.id.to_string() == *id) else {
                return message(404, "Song not found");
            };
            let status = if range.is_some() && state.partial_content {
                206
            } else {
                200
            };
            let mut response = Response::new(status);
            response.set_body(AUDIO.to_vec());
            let _ = response.insert_header("Content-Type", "audio/mpeg");
            let _ = response.insert_header("X-Song", song.song_name.as_str());
            response
        }
        (Method::Put, ["wynk", "user", "playlist", "addSong"]) => {
            let (Some(pid), Some(sid)) = (query_id(query, "playlistId"), query_id(query, "songId"))
            else {
                return message(400, "Missing ids");
            };
            let Some(song) = state.songs.iter().find(|s| s.id == sid).cloned() else {
                return message(404, "Song not found");
            };
            match state
                .playlists
                .iter_mut()
                .find(|p| p.id == pid && p.user_name == user)
            {
                Some(playlist) => {
                    if !playlist.contains(sid) {
                        playlist.songs.push(song);
                    }
                    json_response(200, json!({"message": "Song added"}))
                }
                None => message(404, "Playlist not found"),
            }
        }
        (Method::Delete, ["wynk", "user", "playlist", "removeSong"]) => {
            let (Some(pid), Some(sid)) = (query_id(query, "playlistId"), query_id(query, "songId"))
            else {
                return message(400, "Missing ids");
            };
            match state
                .playlists
                .iter_mut()
                .find(|p| p.id == pid && p.user_name == user)
            {
                Some(playlist) => {
                    playlist.songs.retain(|s| s.id != sid);
                    json_response(200, json!({"message": "Song removed"}))
                }
                None => message(404, "Playlist not found"),
            }
        }
        (Method::Post, ["wynk", "user", "addPlaylist"]) => {
            let Ok(value) = serde_json::from_slice::<Value>(body) else {
                return message(400, "Malformed body");
            };
            let name = value["name"].as_str().unwrap_or_default().to_string();
            let owner = value["userName"].as_str().unwrap_or_default().to_string();
            let song_id = value["songId"].as_i64().unwrap_or_default();
            if name.is_empty() {
                return message(400, "Playlist name required");
            }
            let songs = state
                .songs
                .iter()
                .filter(|s| s.id == song_id)
                .cloned()
                .collect();
            let id = state.next_playlist_id;
            state.next_playlist_id += 1;
            state.playlists.push(Playlist {
                id,
                playlist_name: name,
                user_name: owner,
                songs,
            });
            json_response(201, json!({ "id": id }))
        }
        (Method::Get, ["wynk", "singer", "getall", name]) => {
            let songs: Vec<&Song> = state
                .songs
                .iter()
                .filter(|s| s.singer_name == *name)
                .collect();
            json_response(200, json!(songs))
        }
        (Method::Post, ["wynk", "singer", "addsong"]) => {
            if role != Role::Performer {
                return message(403, "Only performers can upload");
            }
            let Some(boundary) = content_type.split("boundary=").nth(1) else {
                return message(400, "Expected multipart body");
            };
            let fields = multipart_fields(body, boundary.trim_matches('"'));
            let (Some(name), Some(singer)) = (fields.get("name"), fields.get("singerName")) else {
                return message(400, "Missing fields");
            };
            if !fields.contains_key("file") {
                return message(400, "Missing file");
            }
            let id = state.next_song_id;
            state.next_song_id += 1;
            state.songs.push(Song {
                id,
                song_name: name.clone(),
                singer_name: singer.clone(),
                rating: 0.0,
            });
            state.uploads.push(fields);
            json_response(201, json!({ "id": id }))
        }
        (Method::Delete, ["wynk", "singer", "removesong", id]) => {
            let Some(index) = state.songs.iter().position(|s| s.id.to_string() == *id) else {
                return message(404, "Song not found");
            };
            if state.songs[index].singer_name != user {
                return message(403, "Not your song");
            }
            let removed = state.songs.remove(index);
            for playlist in &mut state.playlists {
                playlist.songs.retain(|s| s.id != removed.id);
            }
            json_response(200, json!({"message": "Song deleted"}))
        }
        _ => message(404, "Not found"),
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeWynk {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let offline = {
            let mut state = self.state.lock().unwrap();
            match state.offline_after {
                Some(0) => state.offline = true,
                Some(left) => state.offline_after = Some(left - 1),
                None => {}
            }
            state.offline
        };
        if offline {
            return Err(Error::from_str(
                StatusCode::ServiceUnavailable,
                "connection refused",
            ));
        }
        let method = req.method();
        let body = req.body_bytes().await?;
        Ok(self.handle(method, &req, body))
    }
}

fn credentials(body: &[u8]) -> Option<(String, String)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    Some((
        value["name"].as_str()?.to_string(),
        value["password"].as_str()?.to_string(),
    ))
}

fn query_id(query: &HashMap<String, String>, key: &str) -> Option<i64> {
    query.get(key)?.parse().ok()
}

fn json_response(status: u16, body: Value) -> Response {
    let mut response = Response::new(status);
    response.set_body(body.to_string());
    let _ = response.insert_header("Content-Type", "application/json");
    response
}

fn message(status: u16, text: &str) -> Response {
    json_response(status, json!({ "message": text }))
}

/// Text values of each part, with file parts recorded by their file name.
fn multipart_fields(body: &[u8], boundary: &str) -> HashMap<String, String> {
    let body = String::from_utf8_lossy(body);
    let delimiter = format!("--{boundary}");
    let mut fields = HashMap::new();
    for part in body.split(delimiter.as_str()) {
        let Some((head, value)) = part.split_once("\r\n\r\n") else {
            continue;
        };
        let Some(name) = head
            .split("name=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
        else {
            continue;
        };
        let value = match head.split("filename=\"").nth(1) {
            Some(rest) => rest.split('"').next().unwrap_or_default().to_string(),
            None => value.trim_end_matches("\r\n").to_string(),
        };
        fields.insert(name.to_string(), value);
    }
    fields
}
