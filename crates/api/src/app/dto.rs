use serde::{Deserialize, Serialize};

use devmart_contact::{Priority, SubmissionStatus};
use devmart_purchasing::BuyerDetails;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub project_id: String,
    pub details: BuyerDetails,
}

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub status: Option<SubmissionStatus>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterFileRequest {
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<u64>,
    pub file_type: Option<String>,
    #[serde(default)]
    pub is_main_file: bool,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user_id: String,
    pub role: devmart_auth::Role,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub purchase_id: String,
    pub license_key: String,
    pub amount: u64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub purchase_id: String,
    pub project_id: String,
    /// Resolved from file storage when the project has a main file.
    pub download_url: Option<String>,
}
