use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn get_athena_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_athena"))
}

/// Run with an isolated session file and no inherited Athena settings.
fn athena_command(args: &[&str], session: &Path) -> Command {
    let mut cmd = Command::new(get_athena_binary());
    cmd.args(args)
        .env("ATHENA_SESSION_PATH", session)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ATHENA_LOG_LEVEL")
        .env_remove("ATHENA_API_URL")
        .env_remove("ATHENA_CREATOR_API_URL")
        .env_remove("ATHENA_USER_ID")
        .env_remove("ATHENA_PASSWORD");
    cmd
}

fn run_athena(args: &[&str]) -> Output {
    let dir = TempDir::new().unwrap();
    athena_command(args, &dir.path().join("session.json"))
        .output()
        .expect("Failed to execute athena command")
}

async fn run_athena_with_env(args: &[&str], session: &Path, env_vars: &[(&str, &str)]) -> Output {
    let mut cmd = tokio::process::Command::from(athena_command(args, session));
    for (key, value) in env_vars {
        cmd.env(key, value);
    }
    cmd.output().await.expect("Failed to execute athena command")
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
        let output = run_athena(&["version"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version command should succeed");
        assert!(stdout.contains("athena"), "output should contain 'athena'");
        assert!(
            stdout.contains(env!("CARGO_PKG_VERSION")),
            "output should contain version number"
        );
    }

    #[test]
    fn test_version_command_detailed() {
        let output = run_athena(&["version", "--detailed"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "version --detailed should succeed");
        assert!(stdout.contains("Version"));
        assert!(stdout.contains("Apache-2.0"));
        assert!(stdout.contains("Instructor"), "output should list roles");
    }
}

mod help_command_tests {
    use super::*;

    #[test]
    fn test_help_lists_commands() {
        let output = run_athena(&["--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "--help should succeed");
        for command in ["login", "logout", "dashboard", "agents", "train", "chat"] {
            assert!(stdout.contains(command), "help should mention {}", command);
        }
    }

    #[test]
    fn test_agents_help() {
        let output = run_athena(&["agents", "--help"]);
        let stdout = output_to_string(&output);

        assert!(output.status.success(), "agents --help should succeed");
        assert!(stdout.contains("create"));
        assert!(stdout.contains("delete"));
    }

    #[test]
    fn test_invalid_command() {
        let output = run_athena(&["enroll"]);
        assert!(!output.status.success(), "unknown command should fail");
    }
}

mod session_command_tests {
    use super::*;

    #[test]
    fn test_whoami_without_session() {
        let output = run_athena(&["whoami"]);
        let stderr = stderr_to_string(&output);

        assert!(!output.status.success());
        assert!(stderr.contains("Not signed in"), "stderr was: {}", stderr);
    }

    #[test]
    fn test_agents_requires_sign_in() {
        let output = run_athena(&["agents", "list"]);
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("E2002"));
    }

    #[test]
    fn test_logout_without_session_succeeds() {
        let output = run_athena(&["logout"]);
        assert!(output.status.success());
        assert!(output_to_string(&output).contains("No active session"));
    }

    #[test]
    fn test_train_rejects_non_pdf_before_network() {
        let dir = TempDir::new().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"user": {"user_id": "T001", "role": "instructor"}}"#,
        )
        .unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "plain text").unwrap();

        let output = athena_command(
            &["train", "7", notes.to_str().unwrap()],
            &session,
        )
        .env("ATHENA_API_URL", "http://127.0.0.1:9")
        .output()
        .unwrap();

        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("E6001"));
    }
}

mod login_flow_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_persists_session_and_lists_agents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"user_id": "T001", "name": "Dr. Haddad", "role": "instructor"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/creator/agents"))
            .and(query_param("creator_id", "T001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"id": 7, "domain": "Computer Science", "campus": "Main", "courses": ["CS101"]}]
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let session = dir.path().join("session.json");
        let uri = server.uri();
        let env = [("ATHENA_API_URL", uri.as_str()), ("ATHENA_PASSWORD", "secret")];

        let output = run_athena_with_env(&["login", "--user-id", "T001"], &session, &env).await;
        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));
        assert!(output_to_string(&output).contains("/creator"));
        assert!(session.exists(), "login should persist the session");

        let output =
            run_athena_with_env(&["--format", "json", "agents", "list"], &session, &env).await;
        assert!(output.status.success(), "stderr: {}", stderr_to_string(&output));
        let agents: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(agents[0]["domain"], "Computer Science");

        let output = run_athena_with_env(&["logout"], &session, &env).await;
        assert!(output.status.success());
        let output = run_athena_with_env(&["whoami"], &session, &env).await;
        assert!(!output.status.success());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_student_cannot_open_agent_management() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"user_id": "S001", "role": "student"}
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let session = dir.path().join("session.json");
        let uri = server.uri();
        let env = [("ATHENA_API_URL", uri.as_str())];

        let output = run_athena_with_env(
            &["login", "--user-id", "S001", "--password", "pw"],
            &session,
            &env,
        )
        .await;
        assert!(output.status.success());
        assert!(output_to_string(&output).contains("/student"));

        let output = run_athena_with_env(&["agents", "list"], &session, &env).await;
        assert!(!output.status.success());
        assert!(stderr_to_string(&output).contains("/creator"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_agent_list_reports_the_error_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/creator/agents"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let session = dir.path().join("session.json");
        std::fs::write(
            &session,
            r#"{"user": {"user_id": "T001", "role": "instructor"}}"#,
        )
        .unwrap();
        let uri = server.uri();
        let env = [("ATHENA_API_URL", uri.as_str())];

        let output = run_athena_with_env(&["agents", "list"], &session, &env).await;
        let stderr = stderr_to_string(&output);
        assert!(!output.status.success());
        assert_eq!(stderr.matches("db down").count(), 1, "stderr was: {}", stderr);
        assert!(output_to_string(&output).contains("retry"));
    }
}
