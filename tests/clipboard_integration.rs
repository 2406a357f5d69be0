/*!
 * Integration test for clipboard functionality
 */

use std::env;
use std::fs;
use std::process::Command;

use tempfile::tempdir;

#[test]
#[ignore] // This test requires tmux to be running and is ignored by default
          // To run this test manually use: cargo test --test clipboard_integration -- --ignored
fn test_clip_flag() {
    // Skip if not in a tmux session
    if env::var("TMUX").is_err() {
        return;
    }

    // Create a temporary directory with a test file
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("sample.py"), "VALUE = 1\n").unwrap();
    let output_file = temp_dir.path().join("context.md");

    // Run srcmerge with --clip
    let status = Command::new(env!("CARGO_BIN_EXE_srcmerge"))
        .args([
            "--clip",
            "-s",
            &temp_dir.path().to_string_lossy(),
            "-n",
            &temp_dir.path().join("context").to_string_lossy(),
        ])
        .status()
        .unwrap();

    assert!(status.success());
    assert!(output_file.exists());

    let document = fs::read_to_string(&output_file).unwrap();

    // The tmux buffer should hold the generated document
    let clipboard_output = Command::new("tmux").args(["show-buffer"]).output().unwrap();
    let clipboard_content = String::from_utf8_lossy(&clipboard_output.stdout);

    assert_eq!(document, clipboard_content);
}
