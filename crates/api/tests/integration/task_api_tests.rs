use serde_json::{json, Value};

use super::test_utils::{assert_dense, column_of, TestApp};

#[tokio::test]
async fn test_create_task_appends_to_column_end() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "追加语义").await;

    app.create_task(&token, board_id, "todo-a", "TODO").await;
    app.create_task(&token, board_id, "todo-b", "TODO").await;
    app.create_task(&token, board_id, "done-x", "DONE").await;
    app.create_task(&token, board_id, "todo-c", "TODO").await;

    let tasks = app.list_tasks(&token, board_id).await;
    assert_eq!(
        column_of(&tasks, "TODO"),
        vec![
            ("todo-a".to_string(), 0),
            ("todo-b".to_string(), 1),
            ("todo-c".to_string(), 2)
        ]
    );
    assert_eq!(column_of(&tasks, "DONE"), vec![("done-x".to_string(), 0)]);
}

#[tokio::test]
async fn test_create_task_defaults() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "默认值").await;

    let response = app
        .client
        .post(format!("{}/tasks", app.address))
        .bearer_auth(&token)
        .json(&json!({ "boardId": board_id, "title": "只有标题" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let task = &response_body["data"];
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["position"], 0);
    assert_eq!(task["tags"], json!([]));
    assert_eq!(task["priority"], Value::Null);
    assert_eq!(task["assignedTo"], Value::Null);
}

#[tokio::test]
async fn test_create_task_empty_title_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "校验").await;

    let response = app
        .client
        .post(format!("{}/tasks", app.address))
        .bearer_auth(&token)
        .json(&json!({ "boardId": board_id, "title": "  " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("任务标题不能为空"));
}

#[tokio::test]
async fn test_create_task_invalid_status_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "非法状态").await;

    let response = app
        .client
        .post(format!("{}/tasks", app.address))
        .bearer_auth(&token)
        .json(&json!({ "boardId": board_id, "title": "状态拼错了", "status": "DOING" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_create_task_on_foreign_board_not_found() {
    let app = TestApp::spawn().await;
    let owner_token = app.login(1, "alice").await;
    let intruder_token = app.login(2, "mallory").await;
    let board_id = app.create_board(&owner_token, "alice的看板").await;

    let response = app
        .client
        .post(format!("{}/tasks", app.address))
        .bearer_auth(&intruder_token)
        .json(&json!({ "boardId": board_id, "title": "越权创建" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["error"]["type"], "BOARD_NOT_FOUND");
    assert!(app.list_tasks(&owner_token, board_id).await.is_empty());
}

#[tokio::test]
async fn test_list_tasks_requires_board_id() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let response = app
        .client
        .get(format!("{}/tasks", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("boardId"));
}

#[tokio::test]
async fn test_list_tasks_ordered_by_column_then_position() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "全列排序").await;

    app.create_task(&token, board_id, "done-1", "DONE").await;
    app.create_task(&token, board_id, "todo-1", "TODO").await;
    app.create_task(&token, board_id, "pending-1", "PENDING").await;
    app.create_task(&token, board_id, "progress-1", "IN_PROGRESS")
        .await;
    app.create_task(&token, board_id, "todo-2", "TODO").await;

    let tasks = app.list_tasks(&token, board_id).await;
    let titles: Vec<&str> = tasks.iter().map(|t| t["title"].as_str().unwrap()).collect();
    assert_eq!(
        titles,
        vec!["todo-1", "todo-2", "progress-1", "pending-1", "done-1"]
    );
}

#[tokio::test]
async fn test_get_task_includes_board() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "关联看板").await;
    let task_id = app.create_task(&token, board_id, "带看板的任务", "TODO").await;

    let response = app
        .client
        .get(format!("{}/tasks/{}", app.address, task_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let task = &response_body["data"];
    assert_eq!(task["title"], "带看板的任务");
    assert_eq!(task["board"]["id"].as_i64(), Some(board_id));
    assert_eq!(task["board"]["name"], "关联看板");
}

#[tokio::test]
async fn test_update_task_fields() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "字段更新").await;
    let task_id = app.create_task(&token, board_id, "原始标题", "TODO").await;

    let response = app
        .client
        .put(format!("{}/tasks/{}", app.address, task_id))
        .bearer_auth(&token)
        .json(&json!({
            "title": "更新后的标题",
            "priority": "HIGH",
            "assignedTo": "bob",
            "dueDate": "2026-09-01T12:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let task = &response_body["data"];
    assert_eq!(task["title"], "更新后的标题");
    assert_eq!(task["priority"], "HIGH");
    assert_eq!(task["assignedTo"], "bob");
    // 未触及状态与序号
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["position"], 0);
}

#[tokio::test]
async fn test_empty_update_keeps_task_untouched() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "空更新").await;

    app.create_task(&token, board_id, "todo-a", "TODO").await;
    let task_id = app.create_task(&token, board_id, "todo-b", "TODO").await;

    let response = app
        .client
        .put(format!("{}/tasks/{}", app.address, task_id))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let task = &response_body["data"];
    assert_eq!(task["title"], "todo-b");
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["position"], 1);

    // 列内顺序与序号原样
    let tasks = app.list_tasks(&token, board_id).await;
    assert_eq!(
        column_of(&tasks, "TODO"),
        vec![("todo-a".to_string(), 0), ("todo-b".to_string(), 1)]
    );

    // 空更新打在不存在的任务上仍是 404
    let response = app
        .client
        .put(format!("{}/tasks/424242", app.address))
        .bearer_auth(&token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_update_task_rejects_position() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "禁改序号").await;
    let task_id = app.create_task(&token, board_id, "被挪动的任务", "TODO").await;

    let response = app
        .client
        .put(format!("{}/tasks/{}", app.address, task_id))
        .bearer_auth(&token)
        .json(&json!({ "position": 3 }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("position"));
}

#[tokio::test]
async fn test_update_task_rejects_board_id() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "禁改归属").await;
    let other_board_id = app.create_board(&token, "另一个看板").await;
    let task_id = app.create_task(&token, board_id, "想搬家的任务", "TODO").await;

    let response = app
        .client
        .put(format!("{}/tasks/{}", app.address, task_id))
        .bearer_auth(&token)
        .json(&json!({ "boardId": other_board_id }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("boardId"));
}

#[tokio::test]
async fn test_status_update_appends_and_leaves_gap() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "普通更新留洞").await;

    app.create_task(&token, board_id, "todo-a", "TODO").await;
    let task_b = app.create_task(&token, board_id, "todo-b", "TODO").await;
    app.create_task(&token, board_id, "todo-c", "TODO").await;
    app.create_task(&token, board_id, "done-x", "DONE").await;

    let response = app
        .client
        .put(format!("{}/tasks/{}", app.address, task_b))
        .bearer_auth(&token)
        .json(&json!({ "status": "DONE" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["data"]["status"], "DONE");
    // 追加到目标列末尾
    assert_eq!(response_body["data"]["position"], 1);

    let tasks = app.list_tasks(&token, board_id).await;
    assert_eq!(
        column_of(&tasks, "DONE"),
        vec![("done-x".to_string(), 0), ("todo-b".to_string(), 1)]
    );
    // 源列不回填，0..=2 中间留洞
    assert_eq!(
        column_of(&tasks, "TODO"),
        vec![("todo-a".to_string(), 0), ("todo-c".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_delete_task_always_forbidden() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "禁止删除").await;
    let task_id = app.create_task(&token, board_id, "删不掉的任务", "TODO").await;

    let response = app
        .client
        .delete(format!("{}/tasks/{}", app.address, task_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 403);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["error"]["type"], "FORBIDDEN");
    assert!(response_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("任务不允许删除"));

    // 任务原样保留
    let tasks = app.list_tasks(&token, board_id).await;
    assert_eq!(
        column_of(&tasks, "TODO"),
        vec![("删不掉的任务".to_string(), 0)]
    );
    assert_dense(&tasks, "TODO");
}

#[tokio::test]
async fn test_get_missing_task_not_found() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let response = app
        .client
        .get(format!("{}/tasks/424242", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["error"]["type"], "TASK_NOT_FOUND");
}
