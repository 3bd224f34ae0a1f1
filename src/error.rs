use std::path::PathBuf;

/// Everything SDK 的 8 种固定错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeErrorKind {
    Ok,
    Memory,
    Ipc,
    RegisterClassEx,
    CreateWindow,
    CreateThread,
    InvalidIndex,
    InvalidCall,
}

impl NativeErrorKind {
    /// 未知错误码统一归为 InvalidCall
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Memory,
            2 => Self::Ipc,
            3 => Self::RegisterClassEx,
            4 => Self::CreateWindow,
            5 => Self::CreateThread,
            6 => Self::InvalidIndex,
            7 => Self::InvalidCall,
            other => {
                tracing::warn!("未知的 Everything 错误码: {}", other);
                Self::InvalidCall
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Ok => "The operation completed successfully.",
            Self::Memory => "Failed to allocate memory for the search query.",
            Self::Ipc => "IPC is not available.",
            Self::RegisterClassEx => "Failed to register the search query window class.",
            Self::CreateWindow => "Failed to create the search query window.",
            Self::CreateThread => "Failed to create the search query thread.",
            Self::InvalidIndex => {
                "Invalid index. The index must be greater or equal to 0 and less than the number of visible results."
            }
            Self::InvalidCall => "Invalid call.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Everything DLL not available: {0}")]
    NativeUnavailable(String),

    #[error("Everything DLL search error: {}", .0.message())]
    Native(NativeErrorKind),

    #[error("Bad request to Everything API: the query '{query}' is invalid")]
    InvalidQuery { query: String },

    #[error("Everything API endpoint not found. Check the API URL")]
    EndpointNotFound,

    #[error("HTTP error {status} from Everything API")]
    Http { status: u16 },

    #[error("Error connecting to Everything API: {0}")]
    ConnectionFailed(String),

    #[error("Error parsing response from Everything API: {0}")]
    Parse(String),

    #[error("search term too short ({len} chars)")]
    QueryTooShort { len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid legacy settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_codes_map_to_fixed_kinds() {
        assert_eq!(NativeErrorKind::from_code(2), NativeErrorKind::Ipc);
        assert_eq!(NativeErrorKind::from_code(6), NativeErrorKind::InvalidIndex);
        assert_eq!(NativeErrorKind::from_code(42), NativeErrorKind::InvalidCall);
        assert_eq!(
            BackendError::Native(NativeErrorKind::Ipc).to_string(),
            "Everything DLL search error: IPC is not available."
        );
    }

    #[test]
    fn remote_errors_render_context() {
        assert_eq!(
            BackendError::InvalidQuery { query: "a<b".into() }.to_string(),
            "Bad request to Everything API: the query 'a<b' is invalid"
        );
        assert_eq!(
            BackendError::Http { status: 503 }.to_string(),
            "HTTP error 503 from Everything API"
        );
    }
}
