//! Device identity commands

use crate::error::{CliError, CliResult};
use crate::output::{print_single, print_success, print_warning, OutputFormat};
use crate::profile::{settle, Profile};
use clap::Subcommand;
use colored::*;
use serde::Serialize;

/// Device subcommands
#[derive(Subcommand)]
pub enum DeviceCommands {
    /// Show the device identity, creating one if needed
    Show,

    /// Report the stored identity without creating one
    Status,

    /// Re-resolve the identity and resync both storage copies
    Refresh,

    /// Discard the identity and issue a new one
    Reset {
        /// Confirm that history tied to the old identity will be lost
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize)]
struct DeviceInfo {
    device_id: Option<String>,
    state: String,
    profile: String,
}

/// Execute a device command
pub async fn execute(
    command: DeviceCommands,
    profile: &Profile,
    format: OutputFormat,
) -> CliResult<()> {
    let gate = profile.gate();

    match command {
        DeviceCommands::Show => {
            let identity = profile.start()?;
            let info = DeviceInfo {
                device_id: Some(identity.to_string()),
                state: gate.state().label().to_string(),
                profile: profile.dir().display().to_string(),
            };
            render(&info, format)
        }

        DeviceCommands::Status => {
            let current = gate.manager().current();
            match format {
                OutputFormat::Table => match &current {
                    Some(identity) => println!("Stored device ID: {}", identity.to_string().bold()),
                    None => print_warning("No device identity stored"),
                },
                _ => print_single(
                    &DeviceInfo {
                        device_id: current.map(|id| id.to_string()),
                        state: gate.state().label().to_string(),
                        profile: profile.dir().display().to_string(),
                    },
                    format,
                )?,
            }
            Ok(())
        }

        DeviceCommands::Refresh => {
            let identity = settle(gate.refresh())?;
            print_success(&format!("Device identity refreshed: {}", identity));
            Ok(())
        }

        DeviceCommands::Reset { yes } => {
            if !yes {
                return Err(CliError::InvalidInput(
                    "reset discards history and saved books tied to this device; pass --yes to confirm"
                        .into(),
                ));
            }
            let previous = gate.manager().current();
            let identity = settle(gate.reset())?;
            if let Some(previous) = previous {
                println!("Previous: {}", previous.to_string().dimmed());
            }
            print_success(&format!("New device identity: {}", identity));
            Ok(())
        }
    }
}

fn render(info: &DeviceInfo, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            println!(
                "Device ID: {}",
                info.device_id.as_deref().unwrap_or("none").bold()
            );
            println!("State:     {}", info.state.green());
            println!("Profile:   {}", info.profile);
            Ok(())
        }
        _ => print_single(info, format),
    }
}
