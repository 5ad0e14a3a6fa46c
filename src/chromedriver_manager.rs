use std::fs;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, info};

const DRIVER_BINARY: &str = if cfg!(windows) {
    "chromedriver.exe"
} else {
    "chromedriver"
};

/// Provisions and supervises a local ChromeDriver process. A provisioning
/// failure here is fatal to the whole run.
pub struct ChromeDriverManager {
    driver_path: PathBuf,
    process: Arc<Mutex<Option<Child>>>,
}

impl ChromeDriverManager {
    pub fn new() -> Self {
        // CHROMEDRIVER overrides; otherwise the driver lives (or lands,
        // after download) next to the executable.
        let driver_path = match std::env::var("CHROMEDRIVER") {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => {
                let exe_dir = std::env::current_exe()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .parent()
                    .unwrap_or(&PathBuf::from("."))
                    .to_path_buf();
                exe_dir.join(DRIVER_BINARY)
            }
        };

        Self {
            driver_path,
            process: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn ensure_driver_available(&self) -> Result<()> {
        if !self.driver_path.exists() {
            info!(
                "ChromeDriver not found at {:?}, downloading...",
                self.driver_path
            );
            self.download_chromedriver()
                .await
                .context("Failed to download ChromeDriver. Please check your internet connection.")?;
        } else {
            debug!("ChromeDriver found at {:?}", self.driver_path);
        }
        Ok(())
    }

    pub async fn start_driver(&self, port: u16) -> Result<()> {
        self.ensure_driver_available().await?;

        let mut process_guard = self.process.lock().await;
        if process_guard.is_some() {
            debug!("ChromeDriver is already running on port {}", port);
            return Ok(());
        }

        info!("Starting ChromeDriver on port {}...", port);
        let mut cmd = Command::new(&self.driver_path);
        cmd.arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().with_context(|| {
            format!(
                "Failed to start ChromeDriver from {:?}. Make sure Chrome is installed.",
                self.driver_path
            )
        })?;

        *process_guard = Some(child);
        drop(process_guard);

        let ready = self.wait_for_readiness(port, 15).await?;
        if !ready {
            self.stop_driver().await;
            anyhow::bail!(
                "ChromeDriver failed to become ready within 15 seconds. \
                 This might indicate a Chrome installation problem."
            );
        }

        info!("ChromeDriver successfully started on port {}", port);
        Ok(())
    }

    pub async fn stop_driver(&self) {
        let mut process_guard = self.process.lock().await;
        if let Some(mut child) = process_guard.take() {
            let _ = child.kill();
            let _ = child.wait();
            info!("ChromeDriver stopped");
        }
    }

    async fn download_chromedriver(&self) -> Result<()> {
        let version = self.get_latest_version().await?;
        info!("Downloading ChromeDriver version {}", version);

        let platform = driver_platform();
        let download_url = format!(
            "https://edgedl.me.gvt1.com/edgedl/chrome/chrome-for-testing/{}/{}/chromedriver-{}.zip",
            version, platform, platform
        );

        let response = reqwest::get(&download_url).await?;
        let zip_data = response.bytes().await?;

        let temp_dir = std::env::temp_dir();
        let zip_path = temp_dir.join("chromedriver.zip");
        fs::write(&zip_path, zip_data)?;

        let file = fs::File::open(&zip_path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let entry_name = entry.name().to_string();
            // The archive nests the binary as chromedriver-<platform>/<binary>
            if entry_name.ends_with(DRIVER_BINARY) && !entry_name.ends_with('/') {
                debug!("Extracting: {}", entry_name);
                let mut outfile = fs::File::create(&self.driver_path)?;
                std::io::copy(&mut entry, &mut outfile)?;
                break;
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.driver_path, fs::Permissions::from_mode(0o755))?;
        }

        let _ = fs::remove_file(&zip_path);

        info!("ChromeDriver downloaded to {:?}", self.driver_path);
        Ok(())
    }

    async fn wait_for_readiness(&self, port: u16, timeout_secs: u64) -> Result<bool> {
        let client = reqwest::Client::new();
        let url = format!("http://localhost:{}/status", port);
        let timeout = tokio::time::Duration::from_secs(timeout_secs);
        let start = tokio::time::Instant::now();

        while start.elapsed() < timeout {
            if let Ok(response) = client.get(&url).send().await {
                if response.status().is_success() {
                    return Ok(true);
                }
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        }

        Ok(false)
    }

    async fn get_latest_version(&self) -> Result<String> {
        // Chrome 115+ publishes driver builds through the
        // chrome-for-testing endpoints
        let response = reqwest::get(
            "https://googlechromelabs.github.io/chrome-for-testing/LATEST_RELEASE_STABLE",
        )
        .await?;
        let version = response.text().await?.trim().to_string();
        debug!("Latest ChromeDriver version: {}", version);
        Ok(version)
    }
}

fn driver_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            "mac-arm64"
        } else {
            "mac-x64"
        }
    } else if cfg!(target_os = "windows") {
        "win64"
    } else {
        "linux64"
    }
}

impl Drop for ChromeDriverManager {
    fn drop(&mut self) {
        // Best effort cleanup
        if let Ok(mut process_guard) = self.process.try_lock() {
            if let Some(mut child) = process_guard.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}
