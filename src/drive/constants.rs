// Drive API constants
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";
pub const FILES_PATH: &str = "/drive/v3/files";
pub const UPLOAD_FILES_PATH: &str = "/upload/drive/v3/files";

/// MIME type the service uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

// Fields returned for each soft-trashed file
pub const TRASH_RESPONSE_FIELDS: &str = "id,trashed";

// Identity used when no user id is configured
pub const DEFAULT_USER_ID: &str = "me";

pub const MULTIPART_BOUNDARY: &str = "gdrive_model_multipart_boundary";

// OAuth related constants
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost";
