use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

use opsboard_api::auth::{AuthConfig, CurrentUser, InMemorySessionStore};
use opsboard_api::{create_app, ApiConfig};
use opsboard_domain::repositories::{BoardRepository, TaskRepository};
use opsboard_infrastructure::{connect_embedded, SqliteBoardRepository, SqliteTaskRepository};

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    sessions: Arc<InMemorySessionStore>,
    #[allow(dead_code)]
    data_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let data_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = data_dir.path().join("opsboard-test.db");
        let database_url = format!("sqlite:{}", db_path.display());

        let pool = connect_embedded(&database_url)
            .await
            .expect("Failed to set up embedded database");

        let board_repo: Arc<dyn BoardRepository> =
            Arc::new(SqliteBoardRepository::new(pool.clone()));
        let task_repo: Arc<dyn TaskRepository> = Arc::new(SqliteTaskRepository::new(pool));
        let sessions = Arc::new(InMemorySessionStore::new());

        let api_config = ApiConfig {
            auth: AuthConfig::default(),
            ..ApiConfig::default()
        };
        let app = create_app(board_repo, task_repo, sessions.clone(), api_config);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let address = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Failed to start test server");
        });

        TestApp {
            address,
            client: reqwest::Client::new(),
            sessions,
            data_dir,
        }
    }

    /// 为指定用户签发会话令牌
    pub async fn login(&self, user_id: i64, username: &str) -> String {
        self.sessions
            .issue(CurrentUser {
                user_id,
                username: username.to_string(),
            })
            .await
    }

    /// 创建看板并返回其ID
    pub async fn create_board(&self, token: &str, name: &str) -> i64 {
        let response = self
            .client
            .post(format!("{}/boards", self.address))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "create_board '{name}' failed");

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"].as_i64().expect("board id missing")
    }

    /// 在指定看板和状态列创建任务，返回其ID
    pub async fn create_task(&self, token: &str, board_id: i64, title: &str, status: &str) -> i64 {
        let response = self
            .client
            .post(format!("{}/tasks", self.address))
            .bearer_auth(token)
            .json(&json!({ "boardId": board_id, "title": title, "status": status }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201, "create_task '{title}' failed");

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["id"].as_i64().expect("task id missing")
    }

    /// 移动任务到目标 (状态, 序号)，断言成功并返回更新后的任务
    pub async fn move_task(&self, token: &str, task_id: i64, status: &str, position: i64) -> Value {
        let response = self
            .client
            .post(format!("{}/tasks/move", self.address))
            .bearer_auth(token)
            .json(&json!({
                "taskId": task_id,
                "newStatus": status,
                "newPosition": position
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200, "move_task {task_id} failed");

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }

    /// 获取看板下的全部任务（接口返回已按列序排列）
    pub async fn list_tasks(&self, token: &str, board_id: i64) -> Vec<Value> {
        let response = self
            .client
            .get(format!("{}/tasks?boardId={}", self.address, board_id))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200, "list_tasks of {board_id} failed");

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].as_array().expect("task list missing").clone()
    }
}

/// 取指定状态列的 (标题, 序号) 对，沿用接口的列内顺序
pub fn column_of(tasks: &[Value], status: &str) -> Vec<(String, i64)> {
    tasks
        .iter()
        .filter(|t| t["status"] == status)
        .map(|t| {
            (
                t["title"].as_str().unwrap_or_default().to_string(),
                t["position"].as_i64().unwrap_or(-1),
            )
        })
        .collect()
}

/// 断言一个状态列的序号恰为 0..n-1
pub fn assert_dense(tasks: &[Value], status: &str) {
    let mut positions: Vec<i64> = tasks
        .iter()
        .filter(|t| t["status"] == status)
        .map(|t| t["position"].as_i64().unwrap_or(-1))
        .collect();
    positions.sort_unstable();

    let expected: Vec<i64> = (0..positions.len() as i64).collect();
    assert_eq!(
        positions, expected,
        "状态列 {status} 的序号不再连续: {positions:?}"
    );
}
