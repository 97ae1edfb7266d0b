//! Registers the Codex CLI as an MCP server for the project, when the CLI is
//! installed and logged in.

use crate::config::CodexConfig;
use crate::error::{PilotError, Result};
use crate::settings::read_document;
use crate::{io, paths};
use serde_json::{json, Map, Value};
use std::path::Path;

pub const CODEX_PROGRAM: &str = "codex";

/// Credentials file, relative to the home directory.
pub const CODEX_AUTH_FILE: &str = ".codex/auth.json";

const MCP_SERVERS_KEY: &str = "mcpServers";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodexSetup {
    Configured,
    Disabled,
    NotInstalled,
    NotAuthenticated,
}

pub fn detect_codex_cli() -> bool {
    which::which(CODEX_PROGRAM).is_ok()
}

/// True when `<home>/.codex/auth.json` carries `tokens.access_token`.
/// Unreadable or malformed files count as logged out.
pub fn check_codex_auth(home: &Path) -> bool {
    let Ok(text) = std::fs::read_to_string(home.join(CODEX_AUTH_FILE)) else {
        return false;
    };
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("tokens")?.get("access_token").map(|_| ()))
        .is_some()
}

pub fn codex_server_entry(model: &str) -> Value {
    json!({
        "type": "stdio",
        "command": CODEX_PROGRAM,
        "args": ["-m", model, "mcp-server"],
    })
}

/// Merge the `codex` server into `.mcp.json`, keeping every other server
/// and top-level key. A malformed existing file is an error and is left alone.
pub fn write_mcp_config(root: &Path, model: &str) -> Result<()> {
    let path = paths::mcp_path(root);
    let mut doc = if path.exists() {
        read_document(&path)?
    } else {
        Map::new()
    };

    let servers = doc
        .entry(MCP_SERVERS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(servers) = servers.as_object_mut() else {
        return Err(PilotError::NotAnObject(path));
    };
    servers.insert(CODEX_PROGRAM.to_string(), codex_server_entry(model));

    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    io::atomic_write(&path, text.as_bytes())
}

/// Configure Codex MCP for `root` unless disabled, missing or logged out.
pub fn setup_codex_mcp(root: &Path, cfg: &CodexConfig) -> Result<CodexSetup> {
    if !cfg.enabled {
        return Ok(CodexSetup::Disabled);
    }
    if !detect_codex_cli() {
        tracing::debug!("codex CLI not found, skipping MCP setup");
        return Ok(CodexSetup::NotInstalled);
    }
    let home = home::home_dir().ok_or(PilotError::HomeNotFound)?;
    if !check_codex_auth(&home) {
        tracing::info!("codex CLI is not authenticated, skipping MCP setup");
        return Ok(CodexSetup::NotAuthenticated);
    }

    write_mcp_config(root, &cfg.model)?;
    tracing::info!("codex MCP server added to {}", paths::MCP_FILE);
    Ok(CodexSetup::Configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn write_auth(home: &Path, content: &str) {
        fs::create_dir_all(home.join(".codex")).unwrap();
        fs::write(home.join(CODEX_AUTH_FILE), content).unwrap();
    }

    #[test]
    fn auth_requires_access_token() {
        let home = TempDir::new().unwrap();
        assert!(!check_codex_auth(home.path()));

        write_auth(home.path(), r#"{"tokens": {"refresh_token": "r"}}"#);
        assert!(!check_codex_auth(home.path()));

        write_auth(home.path(), "not json");
        assert!(!check_codex_auth(home.path()));

        write_auth(home.path(), r#"{"tokens": "flat"}"#);
        assert!(!check_codex_auth(home.path()));

        write_auth(home.path(), r#"{"tokens": {"access_token": "abc"}}"#);
        assert!(check_codex_auth(home.path()));
    }

    #[test]
    fn creates_mcp_file() {
        let dir = TempDir::new().unwrap();
        write_mcp_config(dir.path(), "gpt-5.2").unwrap();

        let doc: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(".mcp.json")).unwrap())
                .unwrap();
        assert_eq!(
            doc,
            json!({
                "mcpServers": {
                    "codex": {
                        "type": "stdio",
                        "command": "codex",
                        "args": ["-m", "gpt-5.2", "mcp-server"]
                    }
                }
            })
        );
    }

    #[test]
    fn merges_into_existing_servers() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers": {"github": {"command": "gh-mcp"}}, "other": 1}"#,
        )
        .unwrap();

        write_mcp_config(dir.path(), "o3").unwrap();

        let doc: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(".mcp.json")).unwrap())
                .unwrap();
        assert_eq!(doc["mcpServers"]["github"]["command"], "gh-mcp");
        assert_eq!(doc["mcpServers"]["codex"]["args"][1], "o3");
        assert_eq!(doc["other"], 1);
    }

    #[test]
    fn malformed_mcp_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".mcp.json"), "{broken").unwrap();
        let err = write_mcp_config(dir.path(), "gpt-5.2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert_eq!(
            fs::read_to_string(dir.path().join(".mcp.json")).unwrap(),
            "{broken"
        );
    }

    #[test]
    fn disabled_config_skips() {
        let dir = TempDir::new().unwrap();
        let cfg = CodexConfig {
            enabled: false,
            ..CodexConfig::default()
        };
        assert_eq!(
            setup_codex_mcp(dir.path(), &cfg).unwrap(),
            CodexSetup::Disabled
        );
        assert!(!dir.path().join(".mcp.json").exists());
    }
}
