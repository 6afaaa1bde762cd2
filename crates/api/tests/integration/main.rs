//! HTTP集成测试，在嵌入式SQLite上启动完整服务并用真实客户端驱动

mod test_utils;

mod board_api_tests;
mod task_api_tests;
