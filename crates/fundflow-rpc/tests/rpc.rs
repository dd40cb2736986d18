//! End-to-end tests for the JSON-RPC surface.
//!
//! Each test seeds a fresh engine, serves it on an ephemeral local port and
//! drives it over HTTP.
//!
//! Run with:
//!   cargo test -p fundflow-rpc --test rpc

use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::server::ServerHandle;
use serde_json::{json, Value};

use fundflow_rpc::server::{
    ERR_INSUFFICIENT, ERR_NOT_FOUND, ERR_STATE_CONFLICT, ERR_VALIDATION,
};
use fundflow_rpc::{RpcServer, RpcServerState};
use fundflow_seed::{apply_seed, SeedParams};
use fundflow_state::{EngineConfig, LifecycleEngine, StateStore};

// ── Server lifecycle ──────────────────────────────────────────────────────────

struct TestServer {
    url: String,
    client: reqwest::Client,
    handle: ServerHandle,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.handle.stop();
    }
}

async fn start_server() -> TestServer {
    let mut store = StateStore::new();
    let params = SeedParams::default();
    apply_seed(&mut store, &params, chrono::Utc::now().timestamp()).unwrap();
    let engine = Arc::new(LifecycleEngine::new(store, EngineConfig::deterministic(42)));

    let state = Arc::new(RpcServerState {
        engine,
        user: params.user_id.as_str().into(),
    });
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let (bound, handle) = RpcServer::new(state).start(addr).await.unwrap();

    TestServer {
        url: format!("http://{bound}"),
        client: reqwest::Client::new(),
        handle,
    }
}

// ── RPC helpers ───────────────────────────────────────────────────────────────

impl TestServer {
    /// Raw JSON-RPC response body.
    async fn call(&self, method: &str, params: Value) -> Value {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn ok(&self, method: &str, params: Value) -> Value {
        let resp = self.call(method, params).await;
        assert!(resp.get("error").is_none(), "{method} failed: {resp}");
        resp["result"].clone()
    }

    async fn err_code(&self, method: &str, params: Value) -> i64 {
        let resp = self.call(method, params).await;
        resp["error"]["code"]
            .as_i64()
            .unwrap_or_else(|| panic!("{method} unexpectedly succeeded: {resp}"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn feed_and_funding() {
    let s = start_server().await;

    let feed = s.ok("fundflow_listFeed", json!([])).await;
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 5);
    assert_eq!(feed[0]["author"], "Sarah Chen");
    assert_eq!(feed[0]["posted_ago"], "2 hours ago");

    let c = s.ok("fundflow_fundPost", json!(["1", "50", "card-visa"])).await;
    assert_eq!(c["amount"], 5000);
    assert_eq!(c["post"]["current_funding"], 325000);
    assert_eq!(c["amount_display"], "$50");

    assert_eq!(s.err_code("fundflow_fundPost", json!(["1", "0", "card-visa"])).await, ERR_VALIDATION as i64);
    assert_eq!(s.err_code("fundflow_fundPost", json!(["1", "1.234", "card-visa"])).await, ERR_VALIDATION as i64);
    assert_eq!(s.err_code("fundflow_fundPost", json!(["1", "10", " "])).await, ERR_VALIDATION as i64);
    assert_eq!(s.err_code("fundflow_fundPost", json!(["404", "10", "card-visa"])).await, ERR_NOT_FOUND as i64);

    let post = s.ok("fundflow_getPost", json!(["1"])).await;
    assert_eq!(post["current_funding"], 325000);

    let liked = s.ok("fundflow_toggleLike", json!(["1"])).await;
    assert_eq!(liked["likes"], 43);
    assert_eq!(liked["liked"], true);
}

#[tokio::test]
async fn two_step_stage_completion() {
    let s = start_server().await;

    let project = s.ok("fundflow_getProject", json!(["1"])).await;
    assert_eq!(project["total_funding_required"], 750000);
    assert_eq!(project["current_stage_label"], "Stage 2: Planting Phase");

    let pending = s.ok("fundflow_requestStageCompletion", json!(["1", "s2"])).await;
    assert_eq!(pending["stage_name"], "Planting Phase");

    // Not yet completed.
    let project = s.ok("fundflow_getProject", json!(["1"])).await;
    assert_eq!(project["stages"][1]["status"], "in-progress");

    let project = s.ok("fundflow_confirmStageCompletion", json!(["1", "s2"])).await;
    assert_eq!(project["stages"][1]["status"], "completed");
    assert_eq!(project["current_stage_label"], "Stage 3: Maintenance Setup");

    let rename = json!(["1", "s2", {"field": "name", "value": "Renamed"}]);
    assert_eq!(s.err_code("fundflow_updateStage", rename).await, ERR_STATE_CONFLICT as i64);
    assert_eq!(s.err_code("fundflow_removeStage", json!(["1", "s1"])).await, ERR_STATE_CONFLICT as i64);
    assert_eq!(
        s.err_code("fundflow_confirmStageCompletion", json!(["1", "s3"])).await,
        ERR_STATE_CONFLICT as i64
    );

    let project = s
        .ok("fundflow_updateStage", json!(["1", "s3", {"field": "funding_amount", "value": 300000}]))
        .await;
    assert_eq!(project["total_funding_required"], 850000);
}

#[tokio::test]
async fn need_fund_update_reaches_the_feed() {
    let s = start_server().await;

    let posted = s
        .ok(
            "fundflow_submitStatusPost",
            json!(["2", "Beta build is ready for testers", ["beta.png"], "need-fund"]),
        )
        .await;
    let funding_post = &posted["funding_post"];
    assert_eq!(funding_post["stage_id"], "s2");
    assert_eq!(funding_post["funding_goal"], 800000);

    let feed = s.ok("fundflow_listFeed", json!([])).await;
    assert_eq!(feed[0]["id"], funding_post["id"]);
    assert_eq!(feed.as_array().unwrap().len(), 6);

    let missing_media = json!(["2", "No pictures", [], "in-progress"]);
    assert_eq!(s.err_code("fundflow_submitStatusPost", missing_media).await, ERR_VALIDATION as i64);

    let project = s.ok("fundflow_updateProjectNote", json!(["2", "No pictures yet, testers wanted"])).await;
    assert_eq!(project["latest_update"], "No pictures yet, testers wanted");
    assert_eq!(s.err_code("fundflow_updateProjectNote", json!(["2", " "])).await, ERR_VALIDATION as i64);
}

#[tokio::test]
async fn gacha_spends_tokens_until_empty() {
    let s = start_server().await;

    for tokens_left in [1, 0] {
        let pull = s.ok("fundflow_pullGacha", json!([])).await;
        assert_eq!(pull["type"], "unlocked");
        assert_eq!(pull["tokens_left"], tokens_left);
    }
    assert_eq!(s.err_code("fundflow_pullGacha", json!([])).await, ERR_INSUFFICIENT as i64);

    let col = s.ok("fundflow_getCollection", json!([])).await;
    assert_eq!(col["gacha_tokens"], 0);
    assert!(col["companions"].as_array().unwrap().iter().all(|c| c["unlocked"] == true));

    let profile = s.ok("fundflow_getProfile", json!([])).await;
    assert_eq!(profile["display_name"], "Jane Doe");
    assert_eq!(profile["companions_collected"], 5);
}

#[tokio::test]
async fn evolve_and_proposals() {
    let s = start_server().await;

    let col = s.ok("fundflow_getCollection", json!([])).await;
    assert_eq!(col["ready_to_evolve"], json!(["c2"]));

    let bubbly = s.ok("fundflow_evolveCompanion", json!(["c2"])).await;
    assert_eq!(bubbly["stage"], "teen");
    assert_eq!(bubbly["evolution_progress"], 0);
    assert_eq!(s.err_code("fundflow_evolveCompanion", json!(["c1"])).await, ERR_STATE_CONFLICT as i64);

    let draft = json!({
        "title": "Neighbourhood Tool Library",
        "overview": "Lend tools instead of buying them",
        "stages": [{"name": "Shelving", "description": "Build shelves", "funding_amount": 120000}]
    });
    let project = s.ok("fundflow_submitProposal", json!([draft])).await;
    assert_eq!(project["phase"], "proposal");
    assert_eq!(project["owner"], "jane");

    let bad = json!({"title": "", "overview": "x", "stages": []});
    assert_eq!(s.err_code("fundflow_submitProposal", json!([bad])).await, ERR_VALIDATION as i64);

    let projects = s.ok("fundflow_listProjects", json!([])).await;
    assert_eq!(projects.as_array().unwrap().len(), 3);
}
