//! Google Drive preflight check.

use super::CheckResult;
use crate::models::config::DriveConfig;
use crate::services::drive::GoogleDriveClient;
use crate::Error;

/// Check that the drive token can read the library root.
pub async fn check(config: &DriveConfig) -> CheckResult {
    let client = match GoogleDriveClient::from_config(config) {
        Ok(client) => client,
        Err(Error::DriveRootMissing) => {
            return CheckResult::fail(
                "Google Drive",
                "root folder not configured",
                "Set GD_ROOT_FOLDER environment variable",
            )
        }
        Err(_) => {
            return CheckResult::fail(
                "Google Drive",
                "access token not configured",
                "Set GD_ACCESS_TOKEN environment variable",
            )
        }
    };

    match client.verify_access().await {
        Ok(true) => CheckResult::ok("Google Drive", "connected"),
        Ok(false) => CheckResult::fail(
            "Google Drive",
            "root folder not readable",
            "Check GD_ACCESS_TOKEN and GD_ROOT_FOLDER",
        ),
        Err(e) => CheckResult::fail(
            "Google Drive",
            &format!("connection failed: {}", e),
            "Check your network connection",
        ),
    }
}
