//! Generic HTTP downloader: JSON request on stdin, one result line on stdout.

use std::io::Read;
use std::path::Path;

use crate::config::Settings;
use crate::download::{remove_partial, HttpTransfer, Transfer};
use crate::error::{DownloadError, Result};
use crate::outcome::DownloadResult;
use crate::request::DownloadRequest;
use crate::verify::verify_sha256;

/// Reads the whole request from `input` and runs it. Never fails: every
/// error comes back as an error record.
pub fn run<R: Read>(mut input: R, settings: &Settings) -> DownloadResult {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        return DownloadResult::error(DownloadError::MalformedInput(format!(
            "Failed to read input: {}",
            e
        )));
    }

    let result = DownloadRequest::parse(&raw).and_then(|request| download(&request, settings));
    if let Err(ref e) = result {
        log::error!("Download failed: {}", e);
    }
    DownloadResult::from(result)
}

pub fn download(request: &DownloadRequest, settings: &Settings) -> Result<String> {
    log::info!("Download {} requested for {}", request.download_id_label(), request.url);

    let options = request.options();
    let user_agent = options.user_agent.as_deref().unwrap_or(&settings.user_agent);
    let transfer = HttpTransfer::new(user_agent)?;

    execute(&transfer, request)
}

/// Transfer plus optional checksum, cleaning up afterwards if asked to.
pub fn execute<T: Transfer>(transfer: &T, request: &DownloadRequest) -> Result<String> {
    let path = Path::new(&request.file_path);
    let options = request.options();

    let outcome = transfer
        .fetch(&request.url, path, &request.transfer_options())
        .and_then(|_| match options.sha256.as_deref() {
            Some(expected) => verify_sha256(path, expected),
            None => Ok(()),
        });

    match outcome {
        Ok(()) => Ok(request.file_path.clone()),
        Err(e) => {
            if options.remove_partial && e.leaves_partial_file() {
                remove_partial(path);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn request_json(url: &str, path: &Path, options: &str) -> String {
        serde_json::json!({
            "action": "download",
            "url": url,
            "file_path": path,
            "download_id": "dl-1",
            "options": serde_json::from_str::<serde_json::Value>(options).unwrap(),
        })
        .to_string()
    }

    #[test]
    fn downloads_body_byte_for_byte() {
        let body: Vec<u8> = (0..4099u32).map(|i| (i * 7 % 256) as u8).collect();
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/asset.bin")
            .with_status(200)
            .with_body(body.clone())
            .create();

        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("asset.bin");
        let input = request_json(&format!("{}/asset.bin", server.url()), &dest, "{}");

        let result = run(input.as_bytes(), &Settings::default());

        assert_eq!(result, DownloadResult::success(&dest));
        assert_eq!(fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn repeated_runs_produce_identical_files() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/same")
            .with_status(200)
            .with_body("stable bytes")
            .expect(2)
            .create();

        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("same.txt");
        let input = request_json(&format!("{}/same", server.url()), &dest, "{}");

        assert!(run(input.as_bytes(), &Settings::default()).is_success());
        let first = fs::read(&dest).unwrap();
        assert!(run(input.as_bytes(), &Settings::default()).is_success());
        assert_eq!(fs::read(&dest).unwrap(), first);
    }

    #[test]
    fn http_error_becomes_error_record() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing").with_status(404).create();

        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("missing.bin");
        let input = request_json(&format!("{}/missing", server.url()), &dest, "{}");

        match run(input.as_bytes(), &Settings::default()) {
            DownloadResult::Error { error } => assert!(error.contains("404")),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn checksum_mismatch_removes_partial_when_asked() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/tampered")
            .with_status(200)
            .with_body("tampered")
            .create();

        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("tampered.bin");
        let url = format!("{}/tampered", server.url());
        let wrong = "0".repeat(64);

        let keep = request_json(&url, &dest, &format!(r#"{{"sha256":"{}"}}"#, wrong));
        let result = run(keep.as_bytes(), &Settings::default());
        assert!(!result.is_success());
        assert!(dest.exists());

        let clean = request_json(
            &url,
            &dest,
            &format!(r#"{{"sha256":"{}","remove_partial":true}}"#, wrong),
        );
        let result = run(clean.as_bytes(), &Settings::default());
        assert!(!result.is_success());
        assert!(!dest.exists());
    }

    #[test]
    fn http_error_never_removes_existing_file() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/down").with_status(503).create();

        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("keep.bin");
        fs::write(&dest, "previous").unwrap();
        let input = request_json(
            &format!("{}/down", server.url()),
            &dest,
            r#"{"remove_partial":true}"#,
        );

        assert!(!run(input.as_bytes(), &Settings::default()).is_success());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "previous");
    }

    #[test]
    fn numeric_id_and_mistyped_options_still_download() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/lenient")
            .with_status(200)
            .with_body("payload")
            .create();

        let temp = tempfile::tempdir().unwrap();
        let dest = temp.path().join("lenient.bin");
        let input = serde_json::json!({
            "action": "download",
            "url": format!("{}/lenient", server.url()),
            "file_path": dest,
            "download_id": 42,
            "options": {"chunk_size": "big", "remove_partial": "yes"},
        })
        .to_string();

        let result = run(input.as_bytes(), &Settings::default());

        assert_eq!(result, DownloadResult::success(&dest));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "payload");
    }

    #[test]
    fn unknown_action_skips_network() {
        let result = run(&b"{\"action\":\"list\"}"[..], &Settings::default());
        assert_eq!(result, DownloadResult::error("Unknown action: list"));
    }
}
