use std::net::SocketAddr;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    api: String,
    data_dir: String,
    stop: Option<oneshot::Sender<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    // Use an isolated data directory per test run
    let data_dir = std::env::temp_dir()
        .join(format!("vault_e2e_{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    let mut cfg = AppConfig::default();
    cfg.storage.data_dir = data_dir.clone();
    cfg.normalize_and_validate()?;

    let app = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = server::startup::serve(listener, app, shutdown).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { api: format!("{}{}", base_url, cfg.api.prefix), base_url, data_dir, stop: Some(tx) })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_create_get_list() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(format!("{}/users", app.api))
        .json(&json!({"Name": "alice", "Age": 30, "Address": {"City": "Pune"}}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({"status": "created", "resource_name": "alice"}));

    let res = c.get(format!("{}/users/alice", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let user = res.json::<Value>().await?;
    assert_eq!(user["Name"], "alice");
    assert_eq!(user["Age"], 30);
    assert_eq!(user["Address"]["City"], "Pune");

    let res = c.get(format!("{}/users", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let all = res.json::<Vec<Value>>().await?;
    assert_eq!(all.len(), 1);

    // the record is persisted as tab-indented JSON
    let text = std::fs::read_to_string(std::path::Path::new(&app.data_dir).join("users").join("alice.json"))?;
    assert!(text.contains("\t\"Name\": \"alice\""));
    assert!(text.ends_with('\n'));
    Ok(())
}

#[tokio::test]
async fn e2e_create_with_spaces_in_name() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    c.post(format!("{}/users", app.api)).json(&json!({"Name": "mary jane"})).send().await?;
    let res = c.get(format!("{}/users/mary_jane", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["Name"], "mary jane");
    Ok(())
}

#[tokio::test]
async fn e2e_update_merges_and_renames() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    c.post(format!("{}/users", app.api)).json(&json!({"Name": "Bob", "Age": 30})).send().await?;

    let res = c.put(format!("{}/users/Bob", app.api)).json(&json!({"Age": 31})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "updated", "resource_name": "Bob"}));
    let bob = c.get(format!("{}/users/Bob", app.api)).send().await?.json::<Value>().await?;
    assert_eq!(bob["Name"], "Bob");
    assert_eq!(bob["Age"], 31);

    let res = c.put(format!("{}/users/Bob", app.api)).json(&json!({"Name": "Robert"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["resource_name"], "Robert");

    let robert = c.get(format!("{}/users/Robert", app.api)).send().await?.json::<Value>().await?;
    assert_eq!(robert["Age"], 31);
    let res = c.get(format!("{}/users/Bob", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn e2e_delete_one_and_all() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    c.post(format!("{}/users", app.api)).json(&json!({"Name": "alice"})).send().await?;
    c.post(format!("{}/users", app.api)).json(&json!({"Name": "bob"})).send().await?;

    let res = c.delete(format!("{}/users/alice", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "deleted", "resource_name": "alice"}));

    let res = c.delete(format!("{}/users", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": "deleted", "collection_name": "users"}));

    let res = c.get(format!("{}/users", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn e2e_errors() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // missing record: reported as a server error with a message
    let res = c.get(format!("{}/users/missing", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().unwrap_or_default().contains("not found"));

    let res = c.delete(format!("{}/users/missing", app.api)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);

    // record without a name cannot be stored
    let res = c.post(format!("{}/users", app.api)).json(&json!({"Age": 3})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    // malformed body
    let res = c
        .post(format!("{}/users", app.api))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?["message"], "error while decoding request body");
    Ok(())
}
