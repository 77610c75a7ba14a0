//! CLI argument parsing with clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use uiautomator::device::{DeviceWait, DEFAULT_SWIPE_STEPS};
use uiautomator::object::{
    DEFAULT_DRAG_STEPS, DEFAULT_MAX_SWIPES, DEFAULT_PINCH_PERCENT, DEFAULT_PINCH_STEPS,
    DEFAULT_SCROLL_STEPS, DEFAULT_WAIT_MS,
};
use uiautomator::server::DEFAULT_PORT;
use uiautomator_core::actions::{
    Axis, Corner, Direction, Key, Motion, Orientation, Panel, PinchDirection, ScreenPower,
    WaitCondition,
};

const CRITERIA_HELP: &str = "Selector criterion as FIELD=VALUE (repeatable)";

/// Drive Android UI automation from the host.
///
/// Starts the uiautomator JSON-RPC server on the device when needed and
/// issues device and element actions against it. Results are printed as
/// JSON on stdout; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "uiautomator", version)]
pub struct Cli {
    /// Device serial (defaults to $ANDROID_SERIAL)
    #[arg(short, long, global = true, value_name = "SERIAL")]
    pub serial: Option<String>,

    /// Host port forwarded to the server
    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub local_port: u16,

    /// Port the server listens on inside the device
    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub device_port: u16,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List attached devices and their state
    Devices,

    /// Start the automation server on the device
    #[command(after_help = "\
Examples:
  uiautomator start                             # Default ports (9008 -> 9008)
  uiautomator start --local-port 9010           # Forward a different host port
  uiautomator -s emulator-5554 start            # Pick one of several devices")]
    Start,

    /// Stop the automation server and kill leftover server processes
    Stop,

    /// Show the session state
    Status,

    /// Check the server answers (starting it if needed)
    Ping,

    /// Print device information
    Info,

    /// Click at screen coordinates
    Click(PointArgs),

    /// Swipe between two points
    Swipe(LineArgs),

    /// Drag between two points
    Drag(LineArgs),

    /// Press a named key or a raw keycode
    #[command(after_help = "\
Named keys:
  home, back, left, right, up, down, center, menu, search, enter,
  delete (del), recent, volume_up, volume_down, volume_mute, camera, power

Examples:
  uiautomator press back                        # Named key
  uiautomator press 89                          # Keycode
  uiautomator press 89+1                        # Keycode with meta state")]
    Press(PressArgs),

    /// Turn the screen on or off
    Screen(ScreenArgs),

    /// Print or set the display orientation
    #[command(after_help = "\
Values: natural (n, 0), left (l, 90), upsidedown (u, 180), right (r, 270)

Examples:
  uiautomator orientation                       # Print current orientation
  uiautomator orientation left                  # Rotate to landscape")]
    Orientation(OrientationArgs),

    /// Freeze or unfreeze the current rotation
    FreezeRotation(FreezeArgs),

    /// Open the notification shade or quick settings
    Open(OpenArgs),

    /// Dump the window hierarchy XML to a local file
    Dump(DumpArgs),

    /// Save a screenshot to a local file
    Screenshot(ScreenshotArgs),

    /// Wait for the device to idle or for a window update
    Wait(WaitArgs),

    /// Act on the elements matching a selector
    #[command(after_help = "\
Examples:
  uiautomator object -w text=Settings click                  # Click by text
  uiautomator object -w className=android.widget.Button -w text=OK click br
  uiautomator object -w resourceId=com.app:id/name set-text 'Jane'
  uiautomator object -w text=Clock wait gone --timeout 5000
  uiautomator object -w className=android.widget.ListView \\
      --child text=Wi-Fi exists                               # Child selector
  uiautomator object -w scrollable=true scroll vert --to text=About")]
    Object(ObjectArgs),

    /// Show an end-to-end usage example
    Examples,
}

#[derive(Debug, clap::Args)]
pub struct PointArgs {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, clap::Args)]
pub struct LineArgs {
    pub sx: i32,
    pub sy: i32,
    pub ex: i32,
    pub ey: i32,

    /// Number of move steps (each step takes about 5ms)
    #[arg(long, default_value_t = DEFAULT_SWIPE_STEPS)]
    pub steps: u32,
}

#[derive(Debug, clap::Args)]
pub struct PressArgs {
    /// Key name, keycode, or keycode+meta
    pub key: Key,
}

#[derive(Debug, clap::Args)]
pub struct ScreenArgs {
    /// on or off
    pub power: ScreenPower,
}

#[derive(Debug, clap::Args)]
pub struct OrientationArgs {
    /// Orientation to set; omit to print the current one
    pub value: Option<Orientation>,
}

#[derive(Debug, clap::Args)]
pub struct FreezeArgs {
    /// Unfreeze instead of freezing
    #[arg(long)]
    pub unfreeze: bool,
}

#[derive(Debug, clap::Args)]
pub struct OpenArgs {
    /// notification or quick_settings
    pub panel: Panel,
}

#[derive(Debug, clap::Args)]
pub struct DumpArgs {
    /// Local output file
    pub file: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct ScreenshotArgs {
    /// Local output file
    pub file: PathBuf,

    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// JPEG/PNG quality, 0-100
    #[arg(long, default_value_t = 100)]
    pub quality: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WaitTarget {
    /// The foreground application goes idle
    Idle,
    /// A window content update occurs
    Update,
}

#[derive(Debug, clap::Args)]
pub struct WaitArgs {
    #[arg(value_enum)]
    pub target: WaitTarget,

    /// Timeout in milliseconds
    #[arg(short, long, default_value_t = DeviceWait::DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Only wait for updates from this package
    #[arg(long)]
    pub package: Option<String>,
}

impl WaitArgs {
    pub fn to_wait(&self) -> DeviceWait {
        match self.target {
            WaitTarget::Idle => DeviceWait::Idle {
                timeout_ms: self.timeout,
            },
            WaitTarget::Update => DeviceWait::Update {
                timeout_ms: self.timeout,
                package: self.package.clone(),
            },
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct ObjectArgs {
    #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE", help = CRITERIA_HELP)]
    pub criteria: Vec<String>,

    /// Child criterion as FIELD=VALUE (repeatable)
    #[arg(long, value_name = "FIELD=VALUE")]
    pub child: Vec<String>,

    /// Sibling criterion, matched from the parent, as FIELD=VALUE (repeatable)
    #[arg(long, value_name = "FIELD=VALUE")]
    pub sibling: Vec<String>,

    #[command(subcommand)]
    pub action: ObjectCommand,
}

#[derive(Debug, Subcommand)]
pub enum ObjectCommand {
    /// Whether any element matches
    Exists,

    /// Print the element's attributes
    Info,

    /// Print one attribute (aliases: description, class)
    Attr { name: String },

    /// Click the element (center, or a corner: tl, br)
    Click {
        corner: Option<Corner>,

        /// Click and wait for a new window
        #[arg(long, conflicts_with = "corner")]
        wait: bool,

        /// Wait timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_WAIT_MS)]
        timeout: u64,
    },

    /// Long-click the element (center, or a corner: tl, br)
    LongClick { corner: Option<Corner> },

    /// Drag the element to a point
    DragTo {
        x: i32,
        y: i32,
        #[arg(long, default_value_t = DEFAULT_DRAG_STEPS)]
        steps: u32,
    },

    /// Replace the element's text (empty text clears it)
    SetText { text: String },

    /// Clear the element's text
    ClearText,

    /// Swipe within the element: up, down, left, right
    Swipe {
        direction: Direction,
        #[arg(long, default_value_t = uiautomator::object::DEFAULT_SWIPE_STEPS)]
        steps: u32,
    },

    /// Pinch in or out
    Pinch {
        direction: PinchDirection,
        #[arg(long, default_value_t = DEFAULT_PINCH_PERCENT)]
        percent: u32,
        #[arg(long, default_value_t = DEFAULT_PINCH_STEPS)]
        steps: u32,
    },

    /// Fling a scrollable element
    Fling {
        /// vert or horiz
        #[arg(default_value = "vert")]
        axis: Axis,
        /// forward, backward, toBeginning or toEnd
        #[arg(default_value = "forward")]
        motion: Motion,
        #[arg(long, default_value_t = DEFAULT_MAX_SWIPES)]
        max_swipes: u32,
    },

    /// Scroll a scrollable element
    Scroll {
        /// vert or horiz
        #[arg(default_value = "vert")]
        axis: Axis,
        /// forward, backward, toBeginning or toEnd
        #[arg(default_value = "forward")]
        motion: Motion,
        #[arg(long, default_value_t = DEFAULT_SCROLL_STEPS)]
        steps: u32,
        #[arg(long, default_value_t = DEFAULT_MAX_SWIPES)]
        max_swipes: u32,
        /// Scroll until an element matching FIELD=VALUE is visible (repeatable)
        #[arg(long, value_name = "FIELD=VALUE")]
        to: Vec<String>,
    },

    /// Wait until the element exists or is gone
    Wait {
        condition: WaitCondition,
        /// Timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_WAIT_MS)]
        timeout: u64,
    },
}

/// End-to-end example text for the `examples` command.
pub const EXAMPLES_TEXT: &str = r#"End-to-end example: Turn on Wi-Fi from Settings

# 1. Check the device is visible to adb
uiautomator devices

# 2. Start the automation server (later commands also start it on demand)
uiautomator start

# 3. Wake the screen and go home
uiautomator screen on
uiautomator press home

# 4. Open Settings from the launcher
uiautomator object -w text=Settings click --wait

# 5. Scroll to the Wi-Fi entry and open it
uiautomator object -w scrollable=true scroll vert --to text=Wi-Fi
uiautomator object -w text=Wi-Fi click

# 6. Flip the switch and confirm it is checked
uiautomator object -w className=android.widget.Switch click
uiautomator object -w className=android.widget.Switch attr checked

# 7. Save the resulting screen and stop the server
uiautomator screenshot /tmp/wifi.png
uiautomator stop
"#;
