mod common;

use athena_core::{AgentId, AthenaError, TrainingDocument, MAX_UPLOAD_BYTES};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::client_for;

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents).unwrap();
    path
}

fn pdf_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.resize(len, b' ');
    bytes
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn test_accepts_pdf_at_exactly_ten_megabytes() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "syllabus.PDF", &pdf_bytes(MAX_UPLOAD_BYTES as usize));

        let document = TrainingDocument::from_path(&file).await.unwrap();
        assert_eq!(document.size(), MAX_UPLOAD_BYTES);
        assert_eq!(document.file_name(), "syllabus.PDF");
    }

    #[tokio::test]
    async fn test_rejects_one_byte_over_the_limit() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "big.pdf", &pdf_bytes(MAX_UPLOAD_BYTES as usize + 1));

        let err = TrainingDocument::from_path(&file).await.unwrap_err();
        assert!(matches!(err, AthenaError::FileTooLarge { limit_mb: 10, .. }));
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "notes.docx", &pdf_bytes(64));

        let err = TrainingDocument::from_path(&file).await.unwrap_err();
        assert!(matches!(err, AthenaError::UnsupportedFileType(name) if name == "notes.docx"));
    }

    #[tokio::test]
    async fn test_rejects_pdf_extension_without_signature() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "fake.pdf", b"just some text");

        let err = TrainingDocument::from_path(&file).await.unwrap_err();
        assert!(matches!(err, AthenaError::UnsupportedFileType(_)));

        let file = write_file(&dir, "empty.pdf", b"");
        assert!(TrainingDocument::from_path(&file).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = TrainingDocument::from_path(dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn test_upload_sends_file_and_agent_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/train"))
            .and(body_string_contains("name=\"agent_id\""))
            .and(body_string_contains("uuid-42"))
            .and(body_string_contains("filename=\"lecture.pdf\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Document processed",
                "data": {"documentId": "doc-1", "metadata": {"pages": 3, "wordCount": 812}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "lecture.pdf", &pdf_bytes(2048));
        let document = TrainingDocument::from_path(&file).await.unwrap();

        let receipt = client_for(&server)
            .training()
            .upload(&document, &AgentId::new("uuid-42"))
            .await
            .unwrap();

        assert_eq!(receipt.document_id.as_deref(), Some("doc-1"));
        assert_eq!(receipt.pages, Some(3));
        assert_eq!(receipt.word_count, Some(812));
    }

    #[tokio::test]
    async fn test_upload_error_prefers_message_then_error_then_status() {
        let dir = TempDir::new().unwrap();
        let file = write_file(&dir, "lecture.pdf", &pdf_bytes(128));
        let document = TrainingDocument::from_path(&file).await.unwrap();

        for (status, body, expected) in [
            (422, json!({"message": "No text found"}), "No text found"),
            (400, json!({"error": "agent_id missing"}), "agent_id missing"),
            (500, json!({}), "Upload failed! status: 500"),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/train"))
                .respond_with(ResponseTemplate::new(status).set_body_json(body))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .training()
                .upload(&document, &AgentId::new("1"))
                .await
                .unwrap_err();
            match err {
                AthenaError::UploadFailed(message) => assert_eq!(message, expected),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }
}
