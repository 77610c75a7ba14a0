//! Device and element records returned by the automation server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::actions::Orientation;

/// Screen coordinate in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangle in screen pixels, as the server reports element bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Default for Rect {
    fn default() -> Self {
        Self {
            top: 0,
            left: 0,
            bottom: 100,
            right: 100,
        }
    }
}

impl Rect {
    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Result of `deviceInfo`.
///
/// Fields the server adds beyond the known set are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub current_package_name: Option<String>,
    #[serde(default)]
    pub display_width: u32,
    #[serde(default)]
    pub display_height: u32,
    #[serde(default)]
    pub display_rotation: u8,
    #[serde(default)]
    pub display_size_dp_x: u32,
    #[serde(default)]
    pub display_size_dp_y: u32,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub natural_orientation: bool,
    #[serde(default)]
    pub sdk_int: u32,
    #[serde(default)]
    pub screen_on: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceInfo {
    pub fn orientation(&self) -> Option<Orientation> {
        Orientation::from_rotation(self.display_rotation)
    }
}

/// Attribute names an element read may use in place of the server's keys.
pub const ATTRIBUTE_ALIASES: &[(&str, &str)] =
    &[("description", "contentDescription"), ("class", "className")];

/// Result of `objInfo`: the live attributes of one UI element.
///
/// Kept as the raw record so attributes added by newer servers stay
/// reachable through [`ObjectInfo::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectInfo(pub Map<String, Value>);

impl ObjectInfo {
    /// Look up an attribute by its own name, then through [`ATTRIBUTE_ALIASES`].
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).or_else(|| {
            ATTRIBUTE_ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .and_then(|(_, target)| self.0.get(*target))
        })
    }

    fn str_attr(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn text(&self) -> Option<&str> {
        self.str_attr("text")
    }

    pub fn class_name(&self) -> Option<&str> {
        self.str_attr("className")
    }

    pub fn content_description(&self) -> Option<&str> {
        self.str_attr("contentDescription")
    }

    pub fn package_name(&self) -> Option<&str> {
        self.str_attr("packageName")
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.str_attr("resourceName")
    }

    pub fn child_count(&self) -> u64 {
        self.get("childCount").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.get("bounds")
            .and_then(|b| serde_json::from_value(b.clone()).ok())
    }

    pub fn visible_bounds(&self) -> Option<Rect> {
        self.get("visibleBounds")
            .and_then(|b| serde_json::from_value(b.clone()).ok())
    }

    pub fn is_checkable(&self) -> bool {
        self.flag("checkable")
    }

    pub fn is_checked(&self) -> bool {
        self.flag("checked")
    }

    pub fn is_clickable(&self) -> bool {
        self.flag("clickable")
    }

    pub fn is_enabled(&self) -> bool {
        self.flag("enabled")
    }

    pub fn is_focused(&self) -> bool {
        self.flag("focused")
    }

    pub fn is_scrollable(&self) -> bool {
        self.flag("scrollable")
    }

    pub fn is_selected(&self) -> bool {
        self.flag("selected")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_info() -> ObjectInfo {
        serde_json::from_value(json!({
            "text": "OK",
            "className": "android.widget.Button",
            "contentDescription": "Confirm",
            "packageName": "com.android.settings",
            "checkable": false,
            "clickable": true,
            "enabled": true,
            "childCount": 0,
            "bounds": {"top": 10, "left": 20, "bottom": 110, "right": 220},
        }))
        .unwrap()
    }

    #[test]
    fn test_direct_lookup() {
        let info = sample_info();
        assert_eq!(info.get("text"), Some(&json!("OK")));
        assert_eq!(info.text(), Some("OK"));
        assert!(info.is_clickable());
        assert!(!info.is_checkable());
    }

    #[test]
    fn test_alias_lookup() {
        let info = sample_info();
        assert_eq!(info.get("description"), Some(&json!("Confirm")));
        assert_eq!(info.get("class"), Some(&json!("android.widget.Button")));
        assert_eq!(info.get("missing"), None);
    }

    #[test]
    fn test_bounds() {
        let bounds = sample_info().bounds().unwrap();
        assert_eq!(bounds.center(), Point::new(120, 60));
        assert_eq!(bounds.width(), 200);
        assert_eq!(bounds.height(), 100);
    }

    #[test]
    fn test_rect_default() {
        let rect = Rect::default();
        assert_eq!((rect.top, rect.left, rect.bottom, rect.right), (0, 0, 100, 100));
    }

    #[test]
    fn test_device_info_keeps_unknown_fields() {
        let info: DeviceInfo = serde_json::from_value(json!({
            "currentPackageName": "com.android.launcher",
            "displayWidth": 1080,
            "displayHeight": 1920,
            "displayRotation": 1,
            "displaySizeDpX": 360,
            "displaySizeDpY": 640,
            "productName": "sdk_phone",
            "naturalOrientation": true,
            "sdkInt": 18,
            "batteryLevel": 80,
        }))
        .unwrap();

        assert_eq!(info.display_width, 1080);
        assert_eq!(info.orientation(), Some(Orientation::Left));
        assert_eq!(info.extra.get("batteryLevel"), Some(&json!(80)));
    }
}
