use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch home for one test: store, config and HOME all live inside it.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            dir.path().join("codeflux.toml"),
            "[animation]\nguided_delay_ms = 5\nfast_delay_ms = 5\n",
        )
        .expect("write config");
        Self { dir }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    /// The binary, configured to touch nothing outside the sandbox.
    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("codeflux").expect("binary built");
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("CODEFLUX_STORE", self.store_path())
            .env_remove("CODEFLUX_API_KEY")
            .env_remove("GEMINI_API_KEY")
            .env_remove("VITE_GEMINI_API_KEY")
            .env_remove("CODEFLUX_CONTENT_DIR")
            .env_remove("RUST_LOG")
            .arg("--no-color");
        cmd
    }
}
