use crate::error::{ErrorKind, Result};
use crate::options::ChromeOptions;
use crate::session::Session;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Flags shared by every headless invocation.
const HEADLESS_ARGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--hide-scrollbars",
    "--mute-audio",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-extensions",
    "--disable-background-networking",
];

/// Represents a Chrome/Chromium executable.
#[derive(Clone, Debug)]
enum Executable {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { flatpak: PathBuf, app_id: String },
}
impl Executable {
    fn discover() -> Result<Self> {
        // Check for direct executables
        // TODO: What are the executable names on Windows? macOS?
        let executables = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(chrome = %path.display(), "Discovered Chrome executable in PATH");
                return Ok(Self::Binary { path });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            // Check Flatpak installations
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if Command::new(&flatpak).args(["info", app_id]).output().is_ok_and(|o| o.status.success()) {
                    return Ok(Self::Flatpak { flatpak, app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    fn explicit(path: &Path) -> Result<Self> {
        // Bare names ("chromium") are looked up on PATH, anything else must exist as given.
        match which::which(path) {
            Ok(path) => Ok(Self::Binary { path }),
            Err(_) => {
                tracing::warn!(chrome = %path.display(), "Configured Chrome executable is not runnable");
                exn::bail!(ErrorKind::ChromeNotFound)
            },
        }
    }

    /// Base command; Flatpak apps additionally need every host directory
    /// Chrome touches exposed to the sandbox.
    fn command(&self, shared: &[&Path]) -> Command {
        match self {
            Self::Binary { path } => Command::new(path),
            Self::Flatpak { flatpak, app_id } => {
                let mut command = Command::new(flatpak);
                command.arg("run");
                for dir in shared {
                    command.arg(format!("--filesystem={}", dir.display()));
                }
                command.arg(app_id);
                command
            },
        }
    }
}

/// A located Chrome installation plus the options every launch uses.
///
/// Cheap to clone; the same value usually backs both the
/// [`PageRenderer`](crate::PageRenderer) and the
/// [`DocumentFormatter`](crate::DocumentFormatter) of a conversion.
#[derive(Clone, Debug)]
pub struct Chrome {
    executable: Executable,
    options: ChromeOptions,
}
impl Chrome {
    /// Locates Chrome, honouring [`ChromeOptions::executable`] when set.
    pub fn discover(options: ChromeOptions) -> Result<Self> {
        let executable = match &options.executable {
            Some(path) => Executable::explicit(path)?,
            None => Executable::discover()?,
        };
        Ok(Self { executable, options })
    }

    pub fn options(&self) -> &ChromeOptions {
        &self.options
    }

    /// Spawns a headless Chrome with a throw-away profile.
    ///
    /// `shared` lists host directories (besides the profile) that the process
    /// must be able to read or write. `args` follow the common headless flags.
    pub(crate) fn launch<I, S>(&self, shared: &[&Path], args: I) -> Result<Session>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let profile = TempDir::with_prefix("webpdf-profile-").map_err(ErrorKind::from)?;
        let mut command = self.command(profile.path(), shared, args);
        tracing::trace!(?command, "Launching Chrome");
        let child = command.spawn().map_err(ErrorKind::from)?;
        Ok(Session::new(child, profile))
    }

    fn command<I, S>(&self, profile: &Path, shared: &[&Path], args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut dirs = vec![profile];
        dirs.extend_from_slice(shared);
        let mut command = self.executable.command(&dirs);
        command.args(HEADLESS_ARGS);
        command.arg(format!("--user-data-dir={}", profile.display()));
        command.arg(format!("--virtual-time-budget={}", self.options.idle_budget().as_millis()));
        if !self.options.sandbox {
            command.arg("--no-sandbox");
        }
        command.args(args);
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        // Own process group, so the session can kill every helper Chrome forks.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        command
    }
}
