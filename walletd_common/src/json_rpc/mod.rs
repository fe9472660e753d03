use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

mod http;

pub use http::JsonRPCClient;

pub const JSON_RPC_VERSION: &str = "2.0";

const PARSE_ERROR_CODE: i64 = -32700;
const INVALID_REQUEST_CODE: i64 = -32600;
const METHOD_NOT_FOUND_CODE: i64 = -32601;
const INVALID_PARAMS_CODE: i64 = -32602;
const INTERNAL_ERROR_CODE: i64 = -32603;

pub type JsonRPCResult<T> = Result<T, JsonRPCError>;

#[derive(Debug, Deserialize)]
struct JsonRPCErrorResponse {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Error)]
pub enum JsonRPCError {
    #[error("Server failed to parse request JSON data")]
    ParseError,
    #[error("Server received invalid JSON-RPC request")]
    InvalidRequest,
    #[error("Unknown method requested to the server")]
    MethodNotFound,
    #[error("Invalid parameters were provided")]
    InvalidParams,
    #[error("Server internal JSON-RPC error: {}", message)]
    InternalError {
        message: String,
        data: Option<String>,
    },
    #[error("Server returned error: [{}] {}", code, message)]
    ServerError {
        code: i64,
        message: String,
        data: Option<String>,
    },
    #[error("Server returned a response without result")]
    MissingResult,
    #[error("Server returned a response that is not a JSON object")]
    InvalidResponse,
    #[error("Error while (de)serializing JSON data: {}", _0)]
    SerializationError(#[from] serde_json::Error),
    #[error("HTTP error during JSON-RPC communication: {}", _0)]
    HttpError(#[from] reqwest::Error),
}

impl JsonRPCError {
    // true when walletd could not be reached or its answer could not be read
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::InvalidResponse)
    }
}

// Convert a response envelope into its typed result, mapping the error object if any
pub fn parse_response<R: DeserializeOwned>(mut response: Value) -> JsonRPCResult<R> {
    if !response.is_object() {
        return Err(JsonRPCError::InvalidResponse)
    }

    if let Some(error) = response.get_mut("error") {
        let error: JsonRPCErrorResponse = serde_json::from_value(error.take())?;
        let data = match error.data {
            Some(content) => Some(serde_json::to_string_pretty(&content)?),
            None => None,
        };

        return Err(match error.code {
            PARSE_ERROR_CODE => JsonRPCError::ParseError,
            INVALID_REQUEST_CODE => JsonRPCError::InvalidRequest,
            METHOD_NOT_FOUND_CODE => JsonRPCError::MethodNotFound,
            INVALID_PARAMS_CODE => JsonRPCError::InvalidParams,
            INTERNAL_ERROR_CODE => JsonRPCError::InternalError {
                message: error.message,
                data,
            },
            code => JsonRPCError::ServerError {
                code,
                message: error.message,
                data,
            },
        });
    }

    Ok(serde_json::from_value(
        response
            .get_mut("result")
            .ok_or(JsonRPCError::MissingResult)?
            .take(),
    )?)
}
