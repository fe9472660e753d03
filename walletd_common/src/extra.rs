use std::{fs, io, path::Path};
use thiserror::Error;

pub const DEFAULT_CONTENT: &str = r#"
  _____     ____
 /      \  |  o |
|        |/ ___\|
|_________/
|_|_| |_|_|
"#;

#[derive(Debug, Error)]
pub enum ExtraError {
    #[error("Extra content is empty")]
    EmptyContent,
    #[error("Error while reading extra content: {}", _0)]
    Io(#[from] io::Error),
}

// Read the payload from a file, or fall back to the built-in art
pub fn load_content(path: Option<&Path>) -> Result<Vec<u8>, ExtraError> {
    let content = match path {
        Some(path) => fs::read(path)?,
        None => DEFAULT_CONTENT.as_bytes().to_vec(),
    };

    if content.is_empty() {
        return Err(ExtraError::EmptyContent)
    }

    Ok(content)
}

pub fn encode_extra(content: &[u8]) -> String {
    hex::encode(content)
}
