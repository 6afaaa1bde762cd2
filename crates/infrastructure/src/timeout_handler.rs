//! Timeout handling utilities for async operations
//!
//! This module provides standardized timeout handling for all async operations
//! in the storage layer, including queries, multi-statement transactions and
//! schema bootstrap.

use opsboard_errors::OpsboardError;
use opsboard_errors::OpsboardResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, instrument};

/// Default timeout values for different operation types
pub struct TimeoutConfig {
    /// Database operations timeout
    pub database_timeout: Duration,
    /// Long-running operations timeout (migrations, schema bootstrap)
    pub long_running_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            database_timeout: Duration::from_secs(30),
            long_running_timeout: Duration::from_secs(300),
        }
    }
}

/// Timeout handler utility for async operations
pub struct TimeoutHandler {
    config: TimeoutConfig,
}

impl TimeoutHandler {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(TimeoutConfig::default())
    }

    /// Execute database operation with timeout
    #[instrument(skip(self, operation, operation_name))]
    pub async fn database_operation<F, T>(
        &self,
        operation: F,
        operation_name: &str,
    ) -> OpsboardResult<T>
    where
        F: Future<Output = OpsboardResult<T>>,
    {
        self.execute_with_timeout(
            operation,
            self.config.database_timeout,
            "数据库",
            operation_name,
        )
        .await
    }

    /// Execute long-running operation with timeout (migrations, schema bootstrap)
    #[instrument(skip(self, operation, operation_name))]
    pub async fn long_running_operation<F, T>(
        &self,
        operation: F,
        operation_name: &str,
    ) -> OpsboardResult<T>
    where
        F: Future<Output = OpsboardResult<T>>,
    {
        self.execute_with_timeout(
            operation,
            self.config.long_running_timeout,
            "长时间运行",
            operation_name,
        )
        .await
    }

    /// Internal method to execute operation with timeout
    async fn execute_with_timeout<F, T>(
        &self,
        operation: F,
        timeout_duration: Duration,
        operation_type: &str,
        operation_name: &str,
    ) -> OpsboardResult<T>
    where
        F: Future<Output = OpsboardResult<T>>,
    {
        match timeout(timeout_duration, operation).await {
            Ok(result) => result,
            Err(_) => {
                let error_msg = format!(
                    "{operation_type}操作 '{operation_name}' 超时 (超时时间: {timeout_duration:?})"
                );
                error!("{}", error_msg);
                Err(OpsboardError::timeout_error(error_msg))
            }
        }
    }
}

/// Convenience functions for common timeout operations
pub struct TimeoutUtils;

impl TimeoutUtils {
    /// Execute database operation with default timeout
    #[instrument(skip(operation, operation_name))]
    pub async fn database<F, T>(operation: F, operation_name: &str) -> OpsboardResult<T>
    where
        F: Future<Output = OpsboardResult<T>>,
    {
        let handler = TimeoutHandler::with_default_config();
        handler.database_operation(operation, operation_name).await
    }

    /// Execute long-running operation with default timeout
    #[instrument(skip(operation, operation_name))]
    pub async fn long_running<F, T>(operation: F, operation_name: &str) -> OpsboardResult<T>
    where
        F: Future<Output = OpsboardResult<T>>,
    {
        let handler = TimeoutHandler::with_default_config();
        handler.long_running_operation(operation, operation_name).await
    }

    /// Execute with custom timeout duration
    #[instrument(skip(operation, operation_name))]
    pub async fn custom<F, T>(
        operation: F,
        timeout_duration: Duration,
        operation_name: &str,
    ) -> OpsboardResult<T>
    where
        F: Future<Output = OpsboardResult<T>>,
    {
        match timeout(timeout_duration, operation).await {
            Ok(result) => result,
            Err(_) => {
                let error_msg =
                    format!("操作 '{operation_name}' 超时 (超时时间: {timeout_duration:?})");
                error!("{}", error_msg);
                Err(OpsboardError::timeout_error(error_msg))
            }
        }
    }
}
