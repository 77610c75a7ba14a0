//! uiautomator CLI entry point.

mod args;

use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};
use tracing::debug;
use uiautomator::device::ScreenshotOptions;
use uiautomator::object::{Fling, ObjectAction, Scroll};
use uiautomator::server::ServerConfig;
use uiautomator::{AutomatorServer, Device, Selector};

use crate::args::{Cli, Commands, ObjectArgs, ObjectCommand};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON result.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(cli) {
        Ok(Some(output)) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn server_config(cli: &Cli) -> ServerConfig {
    let mut config = ServerConfig::from_env();
    if cli.serial.is_some() {
        config.serial = cli.serial.clone();
    }
    config.local_port = cli.local_port;
    config.device_port = cli.device_port;
    config
}

/// Run one command. `None` means nothing to print.
fn run(cli: Cli) -> anyhow::Result<Option<Value>> {
    // Examples need neither adb nor a device.
    if let Commands::Examples = cli.command {
        println!("{}", args::EXAMPLES_TEXT);
        return Ok(None);
    }

    let config = server_config(&cli);
    debug!("Using {:?}", config);
    let server = AutomatorServer::with_config(config)?;
    let device = Device::new(&server);

    let output = match cli.command {
        Commands::Examples => return Ok(None),
        Commands::Devices => {
            let devices = server
                .transport()
                .list_devices()
                .context("Failed to list devices")?;
            json!(devices)
        }
        Commands::Start => {
            server.start(cli.local_port, cli.device_port)?;
            serde_json::to_value(server.status())?
        }
        Commands::Stop => {
            server.stop()?;
            serde_json::to_value(server.status())?
        }
        Commands::Status => serde_json::to_value(server.status())?,
        Commands::Ping => json!(device.ping()?),
        Commands::Info => serde_json::to_value(device.info()?)?,
        Commands::Click(args) => json!(device.click(args.x, args.y)?),
        Commands::Swipe(args) => {
            json!(device.swipe(args.sx, args.sy, args.ex, args.ey, args.steps)?)
        }
        Commands::Drag(args) => json!(device.drag(args.sx, args.sy, args.ex, args.ey, args.steps)?),
        Commands::Press(args) => json!(device.press(args.key)?),
        Commands::Screen(args) => {
            device.screen(args.power)?;
            json!(args.power.as_str())
        }
        Commands::Orientation(args) => {
            if let Some(orientation) = args.value {
                device.set_orientation(orientation)?;
            }
            json!(device.orientation()?.as_str())
        }
        Commands::FreezeRotation(args) => {
            device.freeze_rotation(!args.unfreeze)?;
            json!({ "frozen": !args.unfreeze })
        }
        Commands::Open(args) => json!(device.open(args.panel)?),
        Commands::Dump(args) => json!(device.dump(&args.file)?),
        Commands::Screenshot(args) => {
            let options = ScreenshotOptions {
                scale: args.scale,
                quality: args.quality,
            };
            json!(device.screenshot(&args.file, options)?)
        }
        Commands::Wait(args) => json!(device.wait(args.to_wait())?),
        Commands::Object(args) => run_object(&device, args)?,
    };
    Ok(Some(output))
}

fn run_object(device: &Device<'_>, args: ObjectArgs) -> anyhow::Result<Value> {
    let mut selector = Selector::parse_criteria(&args.criteria)?;
    if !args.child.is_empty() {
        selector = selector.child_selector(Selector::parse_criteria(&args.child)?);
    }
    if !args.sibling.is_empty() {
        selector = selector.from_parent(Selector::parse_criteria(&args.sibling)?);
    }

    let mut object = device.select(selector)?;
    let output = match args.action {
        ObjectCommand::Exists => json!(object.exists()?),
        ObjectCommand::Info => serde_json::to_value(object.info()?)?,
        ObjectCommand::Attr { name } => object.attr(&name)?,
        ObjectCommand::Click {
            corner,
            wait,
            timeout,
        } => {
            let action = if wait {
                ObjectAction::ClickAndWait {
                    timeout_ms: timeout,
                }
            } else {
                ObjectAction::Click(corner)
            };
            object.perform(action)?
        }
        ObjectCommand::LongClick { corner } => json!(object.long_click(corner)?),
        ObjectCommand::DragTo { x, y, steps } => {
            object.perform(ObjectAction::DragToPoint { x, y, steps })?
        }
        ObjectCommand::SetText { text } => json!(object.set_text(&text)?),
        ObjectCommand::ClearText => {
            object.clear_text()?;
            Value::Null
        }
        ObjectCommand::Swipe { direction, steps } => {
            object.perform(ObjectAction::Swipe { direction, steps })?
        }
        ObjectCommand::Pinch {
            direction,
            percent,
            steps,
        } => object.perform(ObjectAction::Pinch {
            direction,
            percent,
            steps,
        })?,
        ObjectCommand::Fling {
            axis,
            motion,
            max_swipes,
        } => json!(object.fling(axis, Fling::from_motion(motion, max_swipes))?),
        ObjectCommand::Scroll {
            axis,
            motion,
            steps,
            max_swipes,
            to,
        } => {
            let scroll = if to.is_empty() {
                Scroll::from_motion(motion, steps, max_swipes)
            } else {
                Scroll::To(Selector::parse_criteria(&to)?)
            };
            json!(object.scroll(axis, scroll)?)
        }
        ObjectCommand::Wait { condition, timeout } => json!(object.wait(condition, timeout)?),
    };
    Ok(output)
}
