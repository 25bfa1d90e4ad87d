use std::net::SocketAddr;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use timberline_auth::{JwtClaims, RoleKind};
use timberline_core::UserId;
use timberline_infra::AppConfig;

const SECRET: &str = "black-box-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn spawn_app() -> TestServer {
    let config = AppConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        jwt_secret: SECRET.to_string(),
        accept_retries: 3,
    };
    let app = timberline_api::app::build_app(&config);

    let listener = TcpListener::bind(config.bind_addr).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        handle,
    }
}

struct User {
    id: UserId,
    token: String,
}

fn mint_user(role: RoleKind) -> User {
    let now = Utc::now();
    let id = UserId::new();
    let claims = JwtClaims {
        sub: id,
        role,
        issued_at: now - Duration::seconds(5),
        expires_at: now + Duration::minutes(10),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    User { id, token }
}

struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    fn new(server: &TestServer) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: server.base_url.clone(),
        }
    }

    async fn post(&self, user: &User, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&user.token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn put(&self, user: &User, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .http
            .put(format!("{}{}", self.base_url, path))
            .bearer_auth(&user.token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn get(&self, user: &User, path: &str) -> (StatusCode, Value) {
        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&user.token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

/// Owner with a 40 acre property and an open project, plus a registered forester.
struct Scenario {
    owner: User,
    forester: User,
    project_id: String,
}

async fn scenario(client: &Client) -> Scenario {
    let owner = mint_user(RoleKind::Landowner);
    let forester = mint_user(RoleKind::Forester);

    let (status, _) = client
        .put(&owner, "/profile", json!({ "displayName": "Ada Owner", "role": { "kind": "landowner" } }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client
        .put(
            &forester,
            "/profile",
            json!({ "displayName": "Finn Forester", "role": { "kind": "forester", "licenseNumber": "GA-1234" } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = client
        .post(&owner, "/properties", json!({ "name": "Home Place", "acreage": 40.0, "county": "Tift", "state": "GA" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let property_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = client
        .post(&owner, "/projects", json!({ "propertyId": property_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "inquiry");
    assert_eq!(body["data"]["name"], "Home Place");
    let project_id = body["data"]["id"].as_str().unwrap().to_string();

    Scenario {
        owner,
        forester,
        project_id,
    }
}

/// Inquiry to the forester, answered with a quote. Returns the quote id.
async fn quoted(client: &Client, s: &Scenario, amount: f64) -> String {
    let (status, body) = client
        .post(
            &s.owner,
            "/inquiries",
            json!({ "projectId": s.project_id, "toUserId": s.forester.id, "message": "Need a cruise" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let inquiry_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = client
        .post(
            &s.forester,
            &format!("/inquiries/{inquiry_id}/quote"),
            json!({ "amount": amount, "message": "Two weeks" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let server = spawn_app().await;
    let res = reqwest::get(format!("{}/health", server.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_or_forged_token_is_unauthenticated() {
    let server = spawn_app().await;
    let http = reqwest::Client::new();

    let res = http
        .post(format!("{}/acceptQuote", server.base_url))
        .json(&json!({ "quoteId": "q", "projectId": "p" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "unauthenticated");

    let res = http
        .get(format!("{}/projects/{}", server.base_url, UserId::new()))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn accept_quote_requires_both_ids() {
    let server = spawn_app().await;
    let client = Client::new(&server);
    let owner = mint_user(RoleKind::Landowner);

    let (status, body) = client.post(&owner, "/acceptQuote", json!({ "projectId": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid-argument");
    assert!(body["error"]["message"].as_str().unwrap().contains("quoteId"));
}

#[tokio::test]
async fn accept_then_cruise_then_post() {
    let server = spawn_app().await;
    let client = Client::new(&server);
    let s = scenario(&client).await;
    let quote_id = quoted(&client, &s, 1500.0).await;

    // Only the owner may accept.
    let (status, body) = client
        .post(&s.forester, "/acceptQuote", json!({ "quoteId": quote_id, "projectId": s.project_id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "permission-denied");

    let (status, body) = client
        .post(&s.owner, "/acceptQuote", json!({ "quoteId": quote_id, "projectId": s.project_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = client
        .post(&s.owner, "/acceptQuote", json!({ "quoteId": quote_id, "projectId": s.project_id }))
        .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(body["error"]["kind"], "failed-precondition");

    let (_, body) = client.get(&s.forester, &format!("/projects/{}", s.project_id)).await;
    assert_eq!(body["data"]["status"], "cruise_in_progress");
    assert_eq!(body["data"]["foresterId"], json!(s.forester.id));

    let cruise = json!({
        "cruiseData": {
            "details": { "saleName": "Home Place Pine", "bidMethod": "sealed" },
            "inventory": [{
                "name": "Entire Tract",
                "netAcres": 0,
                "products": [{
                    "product": "Pine Sawtimber",
                    "dbhBreakdown": [{ "dbh": "14", "trees": 100, "volume": 200.0, "units": "Tons" }]
                }]
            }]
        }
    });
    let (status, body) = client
        .post(&s.forester, &format!("/projects/{}/cruise", s.project_id), cruise)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "pending_approval");

    let (status, body) = client
        .get(&s.owner, &format!("/projects/{}/inventory", s.project_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"]["pineSawtimber"], json!(200.0));
    assert_eq!(body["data"]["tractAcres"], json!(40.0));

    let (status, body) = client
        .post(&s.owner, &format!("/projects/{}/post", s.project_id), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "open_for_bids");
    assert!(body["data"]["saleId"].is_string());

    let (status, body) = client
        .get(&s.owner, &format!("/projects/{}/activity", s.project_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["kind"].as_str())
        .collect();
    assert!(kinds.contains(&"project.quote.accepted"));
    assert!(kinds.contains(&"project.cruise.submitted"));
    assert!(kinds.contains(&"project.sale.posted"));
}

#[tokio::test]
async fn strangers_cannot_read_projects() {
    let server = spawn_app().await;
    let client = Client::new(&server);
    let s = scenario(&client).await;
    let buyer = mint_user(RoleKind::TimberBuyer);

    let (status, body) = client.get(&buyer, &format!("/projects/{}", s.project_id)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "permission-denied");

    let (status, _) = client.get(&s.owner, &format!("/projects/{}", UserId::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn declining_the_last_inquiry_cancels_the_project() {
    let server = spawn_app().await;
    let client = Client::new(&server);
    let s = scenario(&client).await;

    let (_, body) = client
        .post(
            &s.owner,
            "/inquiries",
            json!({ "projectId": s.project_id, "toUserId": s.forester.id, "message": "Cruise?" }),
        )
        .await;
    let inquiry_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = client
        .post(&s.forester, &format!("/inquiries/{inquiry_id}/decline"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["projectCancelled"], true);
    assert_eq!(body["data"]["inquiry"]["status"], "declined");

    let (status, _) = client.get(&s.owner, &format!("/projects/{}", s.project_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
