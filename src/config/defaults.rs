use super::constants::*;

pub(crate) fn bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

pub(crate) fn completion_endpoint() -> String {
    DEFAULT_COMPLETION_ENDPOINT.to_string()
}

pub(crate) fn completion_model() -> String {
    DEFAULT_COMPLETION_MODEL.to_string()
}

pub(crate) fn identity_endpoint() -> String {
    DEFAULT_IDENTITY_ENDPOINT.to_string()
}

pub(crate) fn log_level() -> Option<String> {
    Some("info".to_string())
}

pub(crate) fn log_file_path() -> String {
    LOG_FILE_PATH.to_string()
}
