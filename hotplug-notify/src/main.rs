use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use hotplug_monitor::MonitorConfig;

mod logging;
mod service;

use service::{ServiceInstaller, ServiceOptions};

/// USB hotplug notifier
///
/// Watches udev for USB and block devices being attached or detached. Each event prints a
/// summary to stdout, shows a desktop notification and plays a short sound.
#[derive(Parser, Debug)]
#[command(name = "hotplug-notify")]
#[command(about = "Desktop notifications and sounds for USB attach/detach")]
#[command(version)]
struct Args {
    /// WAV file to play when a device is connected (default: bundled sound)
    #[arg(long, value_name = "PATH")]
    connect_sound: Option<PathBuf>,

    /// WAV file to play when a device is disconnected (default: bundled sound)
    #[arg(long, value_name = "PATH")]
    disconnect_sound: Option<PathBuf>,

    /// Disable sounds
    #[arg(long)]
    nosound: bool,

    /// Disable desktop notifications
    #[arg(long)]
    nonotif: bool,

    /// Install and start as a systemd user service with the given options
    #[arg(long, conflicts_with = "uninstall")]
    install: bool,

    /// Stop and remove the systemd user service
    #[arg(long)]
    uninstall: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Validate command line arguments
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                    self.log_level
                ));
            }
        }

        Ok(())
    }

    fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            connect_sound: self.connect_sound.clone(),
            disconnect_sound: self.disconnect_sound.clone(),
            no_notifications: self.nonotif,
            no_sound: self.nosound,
        }
    }
}

/// What the invocation asks for
#[derive(Debug)]
enum Command {
    Monitor(MonitorConfig),
    Install(ServiceOptions),
    Uninstall,
}

impl From<Args> for Command {
    fn from(args: Args) -> Self {
        if args.install {
            return Command::Install(args.service_options());
        }
        if args.uninstall {
            return Command::Uninstall;
        }

        let mut config = MonitorConfig::new()
            .with_notifications(!args.nonotif)
            .with_sound(!args.nosound);
        config.connect_sound = args.connect_sound;
        config.disconnect_sound = args.disconnect_sound;
        Command::Monitor(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_logging_from_env(&args.log_level.to_lowercase()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    args.validate()?;

    match Command::from(args) {
        Command::Install(options) => {
            let executable =
                std::env::current_exe().context("Could not get executable path")?;
            ServiceInstaller::for_current_user()?
                .install(&executable, &options)
                .context("Error installing service")
        }
        Command::Uninstall => ServiceInstaller::for_current_user()?
            .uninstall()
            .context("Error uninstalling service"),
        Command::Monitor(config) => monitor(config),
    }
}

#[cfg(target_os = "linux")]
fn monitor(config: MonitorConfig) -> Result<()> {
    use hotplug_monitor::{HotplugMonitor, StopReason};

    debug!("Monitor configuration: {:?}", config);

    let monitor =
        HotplugMonitor::start_udev(&config).context("Error creating udev monitor")?;

    let cancel = monitor.cancel_handle();
    ctrlc::set_handler(move || cancel.cancel())
        .context("Failed to install signal handler")?;

    println!("Monitoring USB devices... (Ctrl+C to stop)");

    let mut handled = 0usize;
    for record in monitor.iter() {
        handled += 1;
        debug!("Handled {} ({})", record.display_message(), record.paths.dev_path);
    }

    match monitor.wait()? {
        StopReason::Cancelled => {
            info!("Stopped after {} device events", handled);
            Ok(())
        }
        StopReason::SourceError(e) => Err(anyhow::anyhow!("Device monitor failed: {}", e)),
        StopReason::SourceClosed => Err(anyhow::anyhow!("Device event stream closed")),
    }
}

#[cfg(not(target_os = "linux"))]
fn monitor(_config: MonitorConfig) -> Result<()> {
    anyhow::bail!("Device monitoring requires Linux udev")
}
