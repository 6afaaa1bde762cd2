use serde_json::{json, Value};

use super::test_utils::TestApp;

#[tokio::test]
async fn test_create_board_success() {
    tracing_subscriber::fmt::init();
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let board_data = json!({
        "name": "生产环境发布",
        "description": "每周五的发布窗口",
        "tags": ["sre", "weekly"],
        "color": "#1E90FF"
    });
    let response = app
        .client
        .post(format!("{}/boards", app.address))
        .bearer_auth(&token)
        .json(&board_data)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["success"].as_bool().unwrap());

    let board = &response_body["data"];
    assert_eq!(board["name"], "生产环境发布");
    assert_eq!(board["description"], "每周五的发布窗口");
    assert_eq!(board["tags"], json!(["sre", "weekly"]));
    assert_eq!(board["color"], "#1E90FF");
    assert_eq!(board["isArchived"], false);
    assert_eq!(board["taskCount"], 0);
    assert_eq!(board["tasks"], json!([]));
}

#[tokio::test]
async fn test_create_board_empty_name_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let response = app
        .client
        .post(format!("{}/boards", app.address))
        .bearer_auth(&token)
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("看板名称不能为空"));
}

#[tokio::test]
async fn test_requests_without_session_are_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/boards", app.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 401);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["error"]["type"], "AUTHENTICATION_ERROR");

    let response = app
        .client
        .post(format!("{}/boards", app.address))
        .json(&json!({ "name": "未登录" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_invalid_session_token_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/boards", app.address))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_archive_hides_board_from_listing_but_keeps_it_fetchable() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let keep_id = app.create_board(&token, "保留的看板").await;
    let archive_id = app.create_board(&token, "待归档的看板").await;

    let response = app
        .client
        .delete(format!("{}/boards/{}", app.address, archive_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert!(response_body["message"].as_str().unwrap().contains("已归档"));

    // 列表里只剩未归档的看板
    let response = app
        .client
        .get(format!("{}/boards", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let boards = response_body["data"].as_array().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0]["id"].as_i64(), Some(keep_id));

    // 归档看板仍可按ID查询
    let response = app
        .client
        .get(format!("{}/boards/{}", app.address, archive_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["data"]["isArchived"], true);
}

#[tokio::test]
async fn test_get_board_includes_ordered_tasks() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;
    let board_id = app.create_board(&token, "任务排序看板").await;

    app.create_task(&token, board_id, "done-task", "DONE").await;
    app.create_task(&token, board_id, "todo-first", "TODO").await;
    app.create_task(&token, board_id, "progress-task", "IN_PROGRESS")
        .await;
    app.create_task(&token, board_id, "todo-second", "TODO").await;

    let response = app
        .client
        .get(format!("{}/boards/{}", app.address, board_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let board = &response_body["data"];
    assert_eq!(board["taskCount"], 4);

    let titles: Vec<&str> = board["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["todo-first", "todo-second", "progress-task", "done-task"]
    );
}

#[tokio::test]
async fn test_update_board_partial() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let response = app
        .client
        .post(format!("{}/boards", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "name": "原始名称",
            "description": "原始描述",
            "color": "gray"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 201);
    let board_id = response.json::<Value>().await.unwrap()["data"]["id"]
        .as_i64()
        .unwrap();

    let response = app
        .client
        .put(format!("{}/boards/{}", app.address, board_id))
        .bearer_auth(&token)
        .json(&json!({ "name": "更新后的名称", "color": "#00FF00" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    let board = &response_body["data"];
    assert_eq!(board["name"], "更新后的名称");
    assert_eq!(board["color"], "#00FF00");
    // 未提交的字段保持原值
    assert_eq!(board["description"], "原始描述");
}

#[tokio::test]
async fn test_foreign_board_is_not_found_and_unmodified() {
    let app = TestApp::spawn().await;
    let owner_token = app.login(1, "alice").await;
    let intruder_token = app.login(2, "mallory").await;

    let board_id = app.create_board(&owner_token, "alice的看板").await;

    // 非归属者的读、改、归档一律 404
    let response = app
        .client
        .get(format!("{}/boards/{}", app.address, board_id))
        .bearer_auth(&intruder_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["error"]["type"], "BOARD_NOT_FOUND");

    let response = app
        .client
        .put(format!("{}/boards/{}", app.address, board_id))
        .bearer_auth(&intruder_token)
        .json(&json!({ "name": "篡改" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);

    let response = app
        .client
        .delete(format!("{}/boards/{}", app.address, board_id))
        .bearer_auth(&intruder_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 404);

    // 归属者视角看板原样未动
    let response = app
        .client
        .get(format!("{}/boards/{}", app.address, board_id))
        .bearer_auth(&owner_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let response_body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(response_body["data"]["name"], "alice的看板");
    assert_eq!(response_body["data"]["isArchived"], false);
}

#[tokio::test]
async fn test_get_missing_board_not_found() {
    let app = TestApp::spawn().await;
    let token = app.login(1, "alice").await;

    let response = app
        .client
        .get(format!("{}/boards/99999", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}
