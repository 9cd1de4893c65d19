//! systemd user service installation
//!
//! `--install` writes a user unit that re-runs this executable with the current sound and
//! notification options, then enables and (re)starts it. `--uninstall` reverses that.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, bail, Context, Result};

use crate::logging::LOG_MODE_ENV;

pub const SERVICE_NAME: &str = "hotplug-notify.service";
pub const PROGRAM_NAME: &str = "hotplug-notify";

/// Options baked into the unit's `ExecStart` line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    pub connect_sound: Option<PathBuf>,
    pub disconnect_sound: Option<PathBuf>,
    pub no_notifications: bool,
    pub no_sound: bool,
}

/// Runs `systemctl --user <args>`.
pub trait Systemctl {
    fn run(&self, args: &[&str]) -> Result<()>;
}

/// The real `systemctl`, output passed through to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserSystemctl;

impl Systemctl for UserSystemctl {
    fn run(&self, args: &[&str]) -> Result<()> {
        println!("Running: systemctl --user {}", args.join(" "));
        let status = Command::new("systemctl")
            .arg("--user")
            .args(args)
            .status()
            .context("Failed to run systemctl")?;
        if !status.success() {
            bail!("systemctl --user {} exited with {}", args.join(" "), status);
        }
        Ok(())
    }
}

/// `~/.config/systemd/user/hotplug-notify.service`
pub fn unit_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home
        .join(".config")
        .join("systemd")
        .join("user")
        .join(SERVICE_NAME))
}

/// Arguments the service passes back to this program.
pub fn service_args(options: &ServiceOptions) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(path) = &options.connect_sound {
        args.push(format!("--connect-sound=\"{}\"", service_path(path).display()));
    }
    if let Some(path) = &options.disconnect_sound {
        args.push(format!("--disconnect-sound=\"{}\"", service_path(path).display()));
    }
    if options.no_notifications {
        args.push("--nonotif".to_string());
    }
    if options.no_sound {
        args.push("--nosound".to_string());
    }
    args
}

// The service runs from a different working directory, so relative paths are resolved now
fn service_path(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(absolute) => absolute,
        Err(e) => {
            tracing::warn!(
                "Could not get absolute path for '{}', using as is: {}",
                path.display(),
                e
            );
            path.to_path_buf()
        }
    }
}

/// Render the unit file.
pub fn render_unit(executable: &Path, args: &[String]) -> String {
    let exec_start = if args.is_empty() {
        executable.display().to_string()
    } else {
        format!("{} {}", executable.display(), args.join(" "))
    };

    format!(
        "[Unit]\n\
         Description={PROGRAM_NAME} - USB device notifier\n\
         After=sound.target\n\
         \n\
         [Service]\n\
         ExecStart={exec_start}\n\
         Environment={LOG_MODE_ENV}=service\n\
         Restart=always\n\
         RestartSec=3\n\
         StandardOutput=journal\n\
         StandardError=journal\n\
         \n\
         [Install]\n\
         WantedBy=default.target\n"
    )
}

/// Installs and removes the user unit at a fixed path.
#[derive(Debug)]
pub struct ServiceInstaller<S: Systemctl = UserSystemctl> {
    unit_path: PathBuf,
    systemctl: S,
}

impl ServiceInstaller<UserSystemctl> {
    pub fn for_current_user() -> Result<Self> {
        Ok(Self::new(unit_path()?, UserSystemctl))
    }
}

impl<S: Systemctl> ServiceInstaller<S> {
    pub fn new(unit_path: impl Into<PathBuf>, systemctl: S) -> Self {
        Self {
            unit_path: unit_path.into(),
            systemctl,
        }
    }

    pub fn unit_path(&self) -> &Path {
        &self.unit_path
    }

    /// Write the unit for `executable`, reload systemd, enable and restart the service.
    pub fn install(&self, executable: &Path, options: &ServiceOptions) -> Result<()> {
        println!("Installing systemd user service...");

        if let Some(dir) = self.unit_path.parent() {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("Could not create systemd user directory {}", dir.display())
            })?;
        }

        let unit = render_unit(executable, &service_args(options));
        std::fs::write(&self.unit_path, unit).with_context(|| {
            format!("Could not write service file {}", self.unit_path.display())
        })?;
        println!("Service file created at {}", self.unit_path().display());

        self.systemctl
            .run(&["daemon-reload"])
            .context("Failed to reload systemd daemons")?;
        self.systemctl
            .run(&["enable", SERVICE_NAME])
            .context("Failed to enable service")?;
        self.systemctl
            .run(&["restart", SERVICE_NAME])
            .context("Failed to start service")?;

        println!("Service {} installed, enabled and started.", SERVICE_NAME);
        println!("Check status with: systemctl --user status {}", SERVICE_NAME);
        println!("View logs with: journalctl --user -u {}", SERVICE_NAME);
        Ok(())
    }

    /// Stop, disable and remove the unit. A missing unit file is not an error.
    pub fn uninstall(&self) -> Result<()> {
        println!("Uninstalling systemd user service...");

        if !self.unit_path.exists() {
            println!(
                "Service file {} does not exist. Nothing to do.",
                self.unit_path.display()
            );
            return Ok(());
        }

        if let Err(e) = self.systemctl.run(&["stop", SERVICE_NAME]) {
            tracing::warn!("Failed to stop service (it might not be running): {:#}", e);
        }
        if let Err(e) = self.systemctl.run(&["disable", SERVICE_NAME]) {
            tracing::warn!("Failed to disable service (it might not be enabled): {:#}", e);
        }

        std::fs::remove_file(&self.unit_path).with_context(|| {
            format!("Failed to remove service file {}", self.unit_path.display())
        })?;
        println!("Service file {} removed.", self.unit_path.display());

        self.systemctl
            .run(&["daemon-reload"])
            .context("Failed to reload systemd daemons")?;
        if let Err(e) = self.systemctl.run(&["reset-failed"]) {
            tracing::warn!("Failed to reset-failed state for user units: {:#}", e);
        }

        println!("Service {} uninstalled.", SERVICE_NAME);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every invocation; fails the ones whose first argument is listed.
    #[derive(Default)]
    struct RecordingSystemctl {
        calls: RefCell<Vec<String>>,
        failing: Vec<&'static str>,
    }

    impl RecordingSystemctl {
        fn failing(commands: &[&'static str]) -> Self {
            Self {
                failing: commands.to_vec(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Systemctl for &RecordingSystemctl {
        fn run(&self, args: &[&str]) -> Result<()> {
            self.calls.borrow_mut().push(args.join(" "));
            if self.failing.contains(&args[0]) {
                bail!("{} failed", args[0]);
            }
            Ok(())
        }
    }

    fn unit_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("systemd").join("user").join(SERVICE_NAME)
    }

    #[test]
    fn test_service_args_default_is_empty() {
        assert!(service_args(&ServiceOptions::default()).is_empty());
    }

    #[test]
    fn test_service_args_flags_and_sounds() {
        let options = ServiceOptions {
            connect_sound: Some(PathBuf::from("/usr/share/sounds/in.wav")),
            disconnect_sound: Some(PathBuf::from("/usr/share/sounds/out.wav")),
            no_notifications: true,
            no_sound: true,
        };

        assert_eq!(
            service_args(&options),
            vec![
                "--connect-sound=\"/usr/share/sounds/in.wav\"",
                "--disconnect-sound=\"/usr/share/sounds/out.wav\"",
                "--nonotif",
                "--nosound",
            ]
        );
    }

    #[test]
    fn test_relative_sound_paths_are_absolutised() {
        let options = ServiceOptions {
            connect_sound: Some(PathBuf::from("sounds/in.wav")),
            ..Default::default()
        };

        let args = service_args(&options);
        let expected = std::env::current_dir().unwrap().join("sounds/in.wav");
        assert_eq!(args, vec![format!("--connect-sound=\"{}\"", expected.display())]);
    }

    #[test]
    fn test_render_unit() {
        let unit = render_unit(
            Path::new("/usr/local/bin/hotplug-notify"),
            &["--nosound".to_string()],
        );

        assert!(unit.starts_with("[Unit]\nDescription=hotplug-notify - USB device notifier\n"));
        assert!(unit.contains("After=sound.target\n"));
        assert!(unit.contains("\n[Service]\nExecStart=/usr/local/bin/hotplug-notify --nosound\n"));
        assert!(unit.contains("Environment=HOTPLUG_LOG_MODE=service\n"));
        assert!(unit.contains("Restart=always\nRestartSec=3\n"));
        assert!(unit.contains("StandardOutput=journal\nStandardError=journal\n"));
        assert!(unit.ends_with("[Install]\nWantedBy=default.target\n"));
    }

    #[test]
    fn test_render_unit_without_args() {
        let unit = render_unit(Path::new("/opt/hotplug-notify"), &[]);
        assert!(unit.contains("ExecStart=/opt/hotplug-notify\n"));
    }

    #[test]
    fn test_install_writes_unit_and_starts_service() {
        let dir = tempfile::tempdir().unwrap();
        let systemctl = RecordingSystemctl::default();
        let installer = ServiceInstaller::new(unit_in(&dir), &systemctl);

        let options = ServiceOptions {
            no_notifications: true,
            ..Default::default()
        };
        installer
            .install(Path::new("/usr/bin/hotplug-notify"), &options)
            .unwrap();

        let unit = std::fs::read_to_string(installer.unit_path()).unwrap();
        assert!(unit.contains("ExecStart=/usr/bin/hotplug-notify --nonotif\n"));
        assert_eq!(
            systemctl.calls(),
            vec![
                "daemon-reload",
                "enable hotplug-notify.service",
                "restart hotplug-notify.service",
            ]
        );
    }

    #[test]
    fn test_install_stops_at_failed_enable() {
        let dir = tempfile::tempdir().unwrap();
        let systemctl = RecordingSystemctl::failing(&["enable"]);
        let installer = ServiceInstaller::new(unit_in(&dir), &systemctl);

        let err = installer
            .install(Path::new("/usr/bin/hotplug-notify"), &ServiceOptions::default())
            .unwrap_err();

        assert!(err.to_string().contains("Failed to enable service"));
        assert_eq!(systemctl.calls().len(), 2);
    }

    #[test]
    fn test_uninstall_without_unit_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let systemctl = RecordingSystemctl::default();
        let installer = ServiceInstaller::new(unit_in(&dir), &systemctl);

        installer.uninstall().unwrap();
        assert!(systemctl.calls().is_empty());
    }

    #[test]
    fn test_uninstall_tolerates_stop_and_disable_failures() {
        let dir = tempfile::tempdir().unwrap();
        let systemctl = RecordingSystemctl::failing(&["stop", "disable", "reset-failed"]);
        let installer = ServiceInstaller::new(unit_in(&dir), &systemctl);

        installer
            .install(Path::new("/usr/bin/hotplug-notify"), &ServiceOptions::default())
            .unwrap();
        installer.uninstall().unwrap();

        assert!(!installer.unit_path().exists());
        assert_eq!(
            systemctl.calls()[3..],
            [
                "stop hotplug-notify.service",
                "disable hotplug-notify.service",
                "daemon-reload",
                "reset-failed",
            ]
        );
    }

    #[test]
    fn test_uninstall_fails_when_reload_fails() {
        let dir = tempfile::tempdir().unwrap();
        let unit = unit_in(&dir);
        std::fs::create_dir_all(unit.parent().unwrap()).unwrap();
        std::fs::write(&unit, "[Unit]\n").unwrap();

        let systemctl = RecordingSystemctl::failing(&["daemon-reload"]);
        let installer = ServiceInstaller::new(&unit, &systemctl);

        let err = installer.uninstall().unwrap_err();
        assert!(err.to_string().contains("Failed to reload systemd daemons"));
        assert!(!unit.exists());
    }
}
