//! Shared test harness: spawns an in-process stub of the TaskFlow backend
//! and hands out gateways wired to an in-memory session store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

use taskflow_client::api::auth::RegisterRequest;
use taskflow_client::api::Gateway;
use taskflow_client::session::{MemorySessionStore, SessionStore};

#[derive(Clone)]
pub struct StubUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

#[derive(Default)]
pub struct StubState {
    users: Mutex<HashMap<String, StubUser>>,
    tokens: Mutex<HashMap<String, String>>,
    tasks: Mutex<Vec<Value>>,
    /// Hits on the /tasks surface, for "no network call was made" assertions.
    task_requests: AtomicUsize,
    /// When set, every /tasks call answers 500.
    fail_tasks: AtomicBool,
}

type Shared = Arc<StubState>;

pub struct TestBackend {
    pub base_url: String,
    pub state: Shared,
}

impl TestBackend {
    pub async fn spawn() -> Result<Self> {
        let state = Arc::new(StubState::default());

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let app = router(state.clone());

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                eprintln!("stub backend exited: {err}");
            }
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{port}"),
            state,
        })
    }

    pub fn api_base(&self) -> Url {
        Url::parse(&format!("{}/api", self.base_url)).expect("stub url")
    }

    pub fn gateway(&self) -> (Arc<Gateway>, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::default());
        let session: Arc<dyn SessionStore> = store.clone();
        (Arc::new(Gateway::new(self.api_base(), session)), store)
    }

    /// Gateway whose forced-logout hook increments the returned counter.
    pub fn gateway_with_logout_counter(
        &self,
    ) -> (Arc<Gateway>, Arc<MemorySessionStore>, Arc<AtomicUsize>) {
        let store = Arc::new(MemorySessionStore::default());
        let session: Arc<dyn SessionStore> = store.clone();
        let fired = Arc::new(AtomicUsize::new(0));
        let hook_fired = fired.clone();
        let gateway = Gateway::new(self.api_base(), session).with_forced_logout(move || {
            hook_fired.fetch_add(1, Ordering::SeqCst);
        });
        (Arc::new(gateway), store, fired)
    }

    /// Register a fresh account and return a gateway holding its session.
    pub async fn signed_in(
        &self,
        name: &str,
        email: &str,
    ) -> Result<(Arc<Gateway>, Arc<MemorySessionStore>)> {
        let (gateway, store) = self.gateway();
        gateway
            .register(&RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: "correct horse".to_string(),
            })
            .await?;
        Ok((gateway, store))
    }

    pub fn task_requests(&self) -> usize {
        self.state.task_requests.load(Ordering::SeqCst)
    }

    pub fn set_tasks_failing(&self, failing: bool) {
        self.state.fail_tasks.store(failing, Ordering::SeqCst);
    }

    /// Insert a task directly into the stub, bypassing the API.
    pub fn seed_task(
        &self,
        email: &str,
        title: &str,
        description: Option<&str>,
        status: &str,
        priority: &str,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let task = json!({
            "id": id,
            "title": title,
            "description": description,
            "status": status,
            "priority": priority,
            "user_email": email,
            "created_at": now,
            "updated_at": now,
        });
        self.state.tasks.lock().unwrap().push(task);
        id
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(get_profile).put(update_profile))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", put(update_task).delete(delete_task))
        .with_state(state)
}

fn user_json(user: &StubUser) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "created_at": user.created_at,
    })
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Invalid credentials" })),
    )
}

fn authenticate(state: &StubState, headers: &HeaderMap) -> Result<String, (StatusCode, Json<Value>)> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;
    let token = header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;
    let tokens = state.tokens.lock().unwrap();
    tokens.get(token).cloned().ok_or_else(unauthorized)
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let mut users = state.users.lock().unwrap();
    if users.contains_key(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Email already registered" })),
        );
    }

    let user = StubUser {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        email: email.clone(),
        password,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    users.insert(email.clone(), user.clone());

    let token = uuid::Uuid::new_v4().to_string();
    state.tokens.lock().unwrap().insert(token.clone(), email);

    (
        StatusCode::OK,
        Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "user": user_json(&user),
        })),
    )
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let users = state.users.lock().unwrap();
    let user = match users.get(email) {
        Some(user) if user.password == password => user.clone(),
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Incorrect email or password" })),
            )
        }
    };
    drop(users);

    let token = uuid::Uuid::new_v4().to_string();
    state
        .tokens
        .lock()
        .unwrap()
        .insert(token.clone(), user.email.clone());

    (
        StatusCode::OK,
        Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "user": user_json(&user),
        })),
    )
}

async fn get_profile(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let email = match authenticate(&state, &headers) {
        Ok(email) => email,
        Err(resp) => return resp,
    };
    let users = state.users.lock().unwrap();
    match users.get(&email) {
        Some(user) => (StatusCode::OK, Json(user_json(user))),
        None => unauthorized(),
    }
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = match authenticate(&state, &headers) {
        Ok(email) => email,
        Err(resp) => return resp,
    };
    let mut users = state.users.lock().unwrap();
    match users.get_mut(&email) {
        Some(user) => {
            if let Some(name) = body["name"].as_str() {
                user.name = name.to_string();
            }
            (StatusCode::OK, Json(user_json(user)))
        }
        None => unauthorized(),
    }
}

fn tasks_unavailable() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "task store unavailable" })),
    )
}

async fn list_tasks(State(state): State<Shared>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    state.task_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_tasks.load(Ordering::SeqCst) {
        return tasks_unavailable();
    }
    let email = match authenticate(&state, &headers) {
        Ok(email) => email,
        Err(resp) => return resp,
    };
    let tasks = state.tasks.lock().unwrap();
    let owned: Vec<Value> = tasks
        .iter()
        .filter(|t| t["user_email"].as_str() == Some(email.as_str()))
        .cloned()
        .collect();
    (StatusCode::OK, Json(Value::Array(owned)))
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.task_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_tasks.load(Ordering::SeqCst) {
        return tasks_unavailable();
    }
    let email = match authenticate(&state, &headers) {
        Ok(email) => email,
        Err(resp) => return resp,
    };

    let now = chrono::Utc::now().to_rfc3339();
    let task = json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "title": body["title"],
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "status": body["status"],
        "priority": body["priority"],
        "user_email": email,
        "created_at": now,
        "updated_at": now,
    });
    state.tasks.lock().unwrap().push(task.clone());
    (StatusCode::OK, Json(task))
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.task_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_tasks.load(Ordering::SeqCst) {
        return tasks_unavailable();
    }
    let email = match authenticate(&state, &headers) {
        Ok(email) => email,
        Err(resp) => return resp,
    };

    let mut tasks = state.tasks.lock().unwrap();
    let task = tasks.iter_mut().find(|t| {
        t["id"].as_str() == Some(id.as_str()) && t["user_email"].as_str() == Some(email.as_str())
    });
    match task {
        Some(task) => {
            for field in ["title", "description", "status", "priority"] {
                if let Some(value) = body.get(field) {
                    task[field] = value.clone();
                }
            }
            task["updated_at"] = json!(chrono::Utc::now().to_rfc3339());
            (StatusCode::OK, Json(task.clone()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Task not found" })),
        ),
    }
}

async fn delete_task(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.task_requests.fetch_add(1, Ordering::SeqCst);
    if state.fail_tasks.load(Ordering::SeqCst) {
        return tasks_unavailable();
    }
    let email = match authenticate(&state, &headers) {
        Ok(email) => email,
        Err(resp) => return resp,
    };

    let mut tasks = state.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|t| {
        !(t["id"].as_str() == Some(id.as_str())
            && t["user_email"].as_str() == Some(email.as_str()))
    });
    if tasks.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Task not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "Task deleted successfully" })),
    )
}
