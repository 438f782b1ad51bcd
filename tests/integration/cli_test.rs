use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn relaychat_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_relaychat"))
}

fn base_command(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(relaychat_binary());
    // keep the user's own config and .env files out of the picture
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env_remove("RELAYCHAT_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn run_relaychat(args: &[&str], env_vars: Vec<(&str, &str)>, stdin: &str) -> Output {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = base_command(&dir);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env_vars {
        cmd.env(key, value);
    }

    let mut child = cmd.spawn().expect("Failed to execute relaychat");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn output_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_to_string(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod version_command_tests {
    use super::*;

    #[test]
    fn test_version_command_basic() {
        let output = run_relaychat(&["version"], vec![], "");
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.contains("relaychat"));
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_relaychat(&["--no-color", "version", "--detailed"], vec![], "");
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("Version:"));
        assert!(stdout.contains("Socket.IO"));
    }

    #[test]
    fn test_help_flag() {
        let output = run_relaychat(&["--help"], vec![], "");
        let stdout = output_to_string(&output);

        assert!(output.status.success());
        assert!(stdout.contains("--url"));
        assert!(stdout.contains("--you-label"));
    }
}

mod config_command_tests {
    use super::*;

    #[test]
    fn test_config_shows_defaults() {
        let output = run_relaychat(&["config"], vec![], "");
        assert!(output.status.success(), "{}", stderr_to_string(&output));

        let config: serde_json::Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        assert_eq!(config["server"]["url"], "http://localhost:5000");
        assert_eq!(config["labels"]["you"], "Вы");
        assert_eq!(config["labels"]["system"], "System");
    }

    #[test]
    fn test_env_and_flags_override() {
        let output = run_relaychat(
            &["config", "--you-label", "Me"],
            vec![("RELAYCHAT_URL", "http://relay.test:9000")],
            "",
        );
        assert!(output.status.success(), "{}", stderr_to_string(&output));

        let config: serde_json::Value = serde_json::from_str(&output_to_string(&output)).unwrap();
        assert_eq!(config["server"]["url"], "http://relay.test:9000");
        assert_eq!(config["labels"]["you"], "Me");
    }

    #[test]
    fn test_invalid_url_fails() {
        let output = run_relaychat(&["config", "--url", "not a url"], vec![], "");
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("Error"));
    }

    #[test]
    fn test_url_with_path_prints_suggestion() {
        let output = run_relaychat(&["--url", "http://127.0.0.1:9/chat"], vec![], "");
        assert!(!output.status.success());

        let stderr = stderr_to_string(&output);
        assert!(stderr.contains("[E1003]"), "stderr was: {stderr}");
        assert!(stderr.contains("Suggestion:"), "stderr was: {stderr}");
    }

    #[test]
    fn test_rust_log_off_is_accepted() {
        let output = run_relaychat(&["config"], vec![("RUST_LOG", "off")], "");
        assert!(output.status.success(), "{}", stderr_to_string(&output));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let output = run_relaychat(&["config", "--config", "/nonexistent/relaychat.toml"], vec![], "");
        assert!(!output.status.success());
    }
}

mod chat_tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio_tungstenite::{accept_async, tungstenite::Message};

    const OPEN: &str = r#"0{"sid":"e","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

    #[test]
    fn test_unreachable_server_prints_notice() {
        let output = run_relaychat(
            &["--no-color", "--url", "http://127.0.0.1:9"],
            vec![("RELAYCHAT_RECONNECT__ENABLED", "false")],
            "",
        );

        assert!(output.status.success(), "{}", stderr_to_string(&output));
        let stdout = output_to_string(&output);
        assert!(
            stdout.contains("System: Ошибка подключения: "),
            "stdout was: {stdout}"
        );
    }

    #[tokio::test]
    async fn test_lines_become_user_messages() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

        let relay = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(Message::text(OPEN)).await.unwrap();

            let mut frames = Vec::new();
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    let text = text.as_str().to_string();
                    if text == "40" {
                        ws.send(Message::text(r#"40{"sid":"cli"}"#)).await.unwrap();
                        continue;
                    }
                    let done = text == "41";
                    frames.push(text);
                    if done {
                        break;
                    }
                }
            }
            frames
        });

        let output = tokio::task::spawn_blocking(move || {
            run_relaychat(
                &["--no-color", "--url", url.as_str()],
                vec![],
                "Hello\n   \n  second line  \n",
            )
        })
        .await
        .unwrap();
        assert!(output.status.success(), "{}", stderr_to_string(&output));

        let frames = relay.await.unwrap();
        assert_eq!(
            frames,
            vec![
                r#"42["user_message",{"text":"Hello"}]"#.to_string(),
                r#"42["user_message",{"text":"second line"}]"#.to_string(),
                "41".to_string(),
            ]
        );
        assert!(!output_to_string(&output).contains("Потеряно соединение"));
    }
}
