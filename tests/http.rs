use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const BRADEN: u64 = 1;

#[derive(Debug, Deserialize)]
struct Player {
    id: u64,
    name: String,
    assists: u64,
    #[serde(rename = "isTracked")]
    is_tracked: bool,
}

#[derive(Debug, Deserialize)]
struct PlayerList {
    success: bool,
    data: Vec<Player>,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct Mutation {
    success: bool,
    data: Player,
    #[serde(rename = "assistLogId")]
    assist_log_id: Option<u64>,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.data_path);
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("assist_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/health")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_assist_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn braden(client: &Client, base_url: &str) -> Player {
    let body: Value = client
        .get(format!("{base_url}/players/{BRADEN}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    serde_json::from_value(body["data"].clone()).unwrap()
}

#[tokio::test]
async fn http_players_are_ranked() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let list: PlayerList = client
        .get(format!("{}/players", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(list.success);
    assert_eq!(list.count, 11);
    assert_eq!(list.data.iter().filter(|p| p.is_tracked).count(), 1);
    for pair in list.data.windows(2) {
        assert!(
            pair[0].assists > pair[1].assists
                || (pair[0].assists == pair[1].assists && pair[0].name <= pair[1].name)
        );
    }
}

#[tokio::test]
async fn http_add_then_undo_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = braden(&client, &server.base_url).await;

    let added: Mutation = client
        .post(format!("{}/players/{BRADEN}/add-assists", server.base_url))
        .json(&json!({ "assists_to_add": 12, "game_date": "2026-01-05" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(added.success);
    assert_eq!(added.data.id, BRADEN);
    assert_eq!(added.data.assists, before.assists + 12);
    let log_id = added.assist_log_id.expect("missing assistLogId");

    let undo = client
        .delete(format!("{}/assists/{log_id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(undo.status(), StatusCode::OK);
    let body: Value = undo.json().await.unwrap();
    assert_eq!(body["data"]["deletedLogId"], json!(log_id));
    assert_eq!(body["data"]["assistsSubtracted"], json!(12));
    assert_eq!(body["data"]["playerId"], json!(BRADEN));
    assert_eq!(braden(&client, &server.base_url).await.assists, before.assists);

    let again = client
        .delete(format!("{}/assists/{log_id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    assert_eq!(braden(&client, &server.base_url).await.assists, before.assists);
}

#[tokio::test]
async fn http_reduce_past_zero_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = braden(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/players/{BRADEN}/reduce-assists", server.base_url))
        .json(&json!({ "assists_to_remove": before.assists + 142 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(braden(&client, &server.base_url).await.assists, before.assists);

    let zero = client
        .post(format!("{}/players/{BRADEN}/add-assists", server.base_url))
        .json(&json!({ "assists_to_add": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_unknown_player_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/players/999", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_ledger_views_reflect_mutations() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let reduced: Mutation = client
        .post(format!("{}/players/2/reduce-assists", server.base_url))
        .json(&json!({ "assists_to_remove": 6 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let log_id = reduced.assist_log_id.unwrap();

    let recent: Value = client
        .get(format!("{}/assists/recent?limit=1", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recent["count"], json!(1));
    assert_eq!(recent["data"][0]["id"], json!(log_id));
    assert_eq!(recent["data"][0]["delta"], json!(-6));

    let summary: Value = client
        .get(format!("{}/assists/stats/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(summary["data"]["total_entries"].as_u64().unwrap() >= 1);

    let index = client.get(&server.base_url).send().await.unwrap();
    assert!(index.status().is_success());
    assert!(index.text().await.unwrap().contains("Braden"));

    client
        .delete(format!("{}/assists/{log_id}", server.base_url))
        .send()
        .await
        .unwrap();
}

#[tokio::test]
async fn http_malformed_requests_get_failure_envelope() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = braden(&client, &server.base_url).await;

    let cases = [
        (
            "string amount",
            client
                .post(format!("{}/players/{BRADEN}/add-assists", server.base_url))
                .json(&json!({ "assists_to_add": "twelve" })),
        ),
        (
            "missing field",
            client
                .post(format!("{}/players/{BRADEN}/add-assists", server.base_url))
                .json(&json!({ "game_date": "2026-01-05" })),
        ),
        (
            "non-numeric id",
            client
                .post(format!("{}/players/abc/reduce-assists", server.base_url))
                .json(&json!({ "assists_to_remove": 1 })),
        ),
        (
            "non-numeric log id",
            client.delete(format!("{}/assists/abc", server.base_url)),
        ),
    ];

    for (label, request) in cases {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{label}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], json!(false), "{label}");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()), "{label}");
    }

    assert_eq!(braden(&client, &server.base_url).await.assists, before.assists);
}

#[tokio::test]
async fn http_set_assists_logs_derived_delta() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = braden(&client, &server.base_url).await;
    let target = before.assists + 25;

    let set: Mutation = client
        .put(format!("{}/players/{BRADEN}", server.base_url))
        .json(&json!({ "assists": target }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(set.success);
    assert_eq!(set.data.assists, target);
    let log_id = set.assist_log_id.expect("missing assistLogId");

    let history: Value = client
        .get(format!("{}/players/{BRADEN}/assists", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history["data"][0]["id"], json!(log_id));
    assert_eq!(history["data"][0]["delta"], json!(25));
    assert_eq!(history["data"][0]["player_id"], json!(BRADEN));

    let unchanged: Mutation = client
        .put(format!("{}/players/{BRADEN}", server.base_url))
        .json(&json!({ "assists": target }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unchanged.assist_log_id, None);

    let negative = client
        .put(format!("{}/players/{BRADEN}", server.base_url))
        .json(&json!({ "assists": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    client
        .delete(format!("{}/assists/{log_id}", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(braden(&client, &server.base_url).await.assists, before.assists);
}

#[tokio::test]
async fn http_leaderboard_reports_tracked_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let tracked = braden(&client, &server.base_url).await;

    let board: Value = client
        .get(format!("{}/leaderboard", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["success"], json!(true));
    assert_eq!(board["data"]["tracked"]["id"], json!(BRADEN));
    assert_eq!(board["data"]["leader"]["name"], json!("John Stockton"));

    let leader = board["data"]["leader"]["assists"].as_u64().unwrap();
    let progress = board["data"]["progress"].as_f64().unwrap();
    assert!((progress - tracked.assists as f64 / leader as f64).abs() < 1e-9);
    assert_eq!(board["data"]["remaining"], json!(leader - tracked.assists));
}

#[tokio::test]
async fn http_assist_log_lists_every_entry_newest_first() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let mut ids = Vec::new();
    for player in [BRADEN, 3] {
        let added: Mutation = client
            .post(format!("{}/players/{player}/add-assists", server.base_url))
            .json(&json!({ "assists_to_add": 2 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(added.assist_log_id.unwrap());
    }

    let log: Value = client
        .get(format!("{}/assists", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = log["data"].as_array().unwrap();
    assert_eq!(log["count"], json!(entries.len()));
    assert_eq!(entries[0]["id"], json!(ids[1]));
    assert_eq!(entries[1]["id"], json!(ids[0]));

    for id in ids.into_iter().rev() {
        let undo = client
            .delete(format!("{}/assists/{id}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(undo.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn http_recent_limit_zero_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let zero = client
        .get(format!("{}/assists/recent?limit=0", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);
    let body: Value = zero.json().await.unwrap();
    assert_eq!(body["success"], json!(false));

    let garbage = client
        .get(format!("{}/assists/recent?limit=lots", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);
}
