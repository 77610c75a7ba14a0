//! Handle on the UI elements matched by a selector.
//!
//! The handle keeps its selector unbuilt and compiles it on every call, so
//! edits made between calls (including to nested selectors) are honoured.
//! Element actions are expressed as [`ObjectAction`] values and sent through
//! a single dispatcher, [`UiObject::perform`].

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;
use uiautomator_core::actions::{Axis, Corner, Direction, Motion, PinchDirection, WaitCondition};
use uiautomator_core::error::ApiError;
use uiautomator_core::info::{ObjectInfo, Point};
use uiautomator_core::protocol::method;
use uiautomator_core::selector::Selector;

use crate::rpc::{self, RpcChannel};

pub const DEFAULT_WAIT_MS: u64 = 3000;
pub const DEFAULT_DRAG_STEPS: u32 = 100;
pub const DEFAULT_GESTURE_STEPS: u32 = 100;
pub const DEFAULT_PINCH_PERCENT: u32 = 100;
pub const DEFAULT_PINCH_STEPS: u32 = 50;
pub const DEFAULT_SWIPE_STEPS: u32 = 10;
pub const DEFAULT_SCROLL_STEPS: u32 = 100;
pub const DEFAULT_MAX_SWIPES: u32 = 1000;

/// Where a fling goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fling {
    Forward,
    Backward,
    ToBeginning { max_swipes: u32 },
    ToEnd { max_swipes: u32 },
}

/// Where a scroll goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Scroll {
    Forward { steps: u32 },
    Backward { steps: u32 },
    ToBeginning { steps: u32, max_swipes: u32 },
    ToEnd { steps: u32, max_swipes: u32 },
    /// Scroll until an element matching the selector is visible.
    To(Selector),
}

/// One element action and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectAction {
    Click(Option<Corner>),
    ClickAndWait { timeout_ms: u64 },
    LongClick(Option<Corner>),
    DragToPoint { x: i32, y: i32, steps: u32 },
    DragToObject { target: Selector, steps: u32 },
    Gesture {
        start1: Point,
        start2: Point,
        end1: Point,
        end2: Point,
        steps: u32,
    },
    Pinch {
        direction: PinchDirection,
        percent: u32,
        steps: u32,
    },
    Swipe { direction: Direction, steps: u32 },
    Fling { axis: Axis, fling: Fling },
    Scroll { axis: Axis, scroll: Scroll },
    SetText(String),
    ClearText,
    Wait {
        condition: WaitCondition,
        timeout_ms: u64,
    },
}

impl ObjectAction {
    pub fn click_and_wait() -> Self {
        ObjectAction::ClickAndWait {
            timeout_ms: DEFAULT_WAIT_MS,
        }
    }

    pub fn drag_to(x: i32, y: i32) -> Self {
        ObjectAction::DragToPoint {
            x,
            y,
            steps: DEFAULT_DRAG_STEPS,
        }
    }

    pub fn drag_to_object(target: Selector) -> Self {
        ObjectAction::DragToObject {
            target,
            steps: DEFAULT_DRAG_STEPS,
        }
    }

    pub fn gesture(start1: Point, start2: Point, end1: Point, end2: Point) -> Self {
        ObjectAction::Gesture {
            start1,
            start2,
            end1,
            end2,
            steps: DEFAULT_GESTURE_STEPS,
        }
    }

    pub fn pinch(direction: PinchDirection) -> Self {
        ObjectAction::Pinch {
            direction,
            percent: DEFAULT_PINCH_PERCENT,
            steps: DEFAULT_PINCH_STEPS,
        }
    }

    pub fn swipe(direction: Direction) -> Self {
        ObjectAction::Swipe {
            direction,
            steps: DEFAULT_SWIPE_STEPS,
        }
    }

    pub fn wait(condition: WaitCondition) -> Self {
        ObjectAction::Wait {
            condition,
            timeout_ms: DEFAULT_WAIT_MS,
        }
    }

    /// Remote method and positional params for this action on `selector`.
    pub fn encode(&self, selector: Value) -> (&'static str, Vec<Value>) {
        match self {
            ObjectAction::Click(None) => (method::CLICK, vec![selector]),
            ObjectAction::Click(Some(corner)) => {
                (method::CLICK, vec![selector, json!(corner.as_str())])
            }
            ObjectAction::ClickAndWait { timeout_ms } => (
                method::CLICK_AND_WAIT_FOR_NEW_WINDOW,
                vec![selector, json!(timeout_ms)],
            ),
            ObjectAction::LongClick(None) => (method::LONG_CLICK, vec![selector]),
            ObjectAction::LongClick(Some(corner)) => {
                (method::LONG_CLICK, vec![selector, json!(corner.as_str())])
            }
            ObjectAction::DragToPoint { x, y, steps } => (
                method::DRAG_TO,
                vec![selector, json!(x), json!(y), json!(steps)],
            ),
            ObjectAction::DragToObject { target, steps } => (
                method::DRAG_TO,
                vec![selector, target.build(), json!(steps)],
            ),
            ObjectAction::Gesture {
                start1,
                start2,
                end1,
                end2,
                steps,
            } => (
                method::GESTURE,
                vec![
                    selector,
                    json!(start1),
                    json!(start2),
                    json!(end1),
                    json!(end2),
                    json!(steps),
                ],
            ),
            ObjectAction::Pinch {
                direction,
                percent,
                steps,
            } => {
                let name = match direction {
                    PinchDirection::In => method::PINCH_IN,
                    PinchDirection::Out => method::PINCH_OUT,
                };
                (name, vec![selector, json!(percent), json!(steps)])
            }
            ObjectAction::Swipe { direction, steps } => (
                method::SWIPE,
                vec![selector, json!(direction.as_str()), json!(steps)],
            ),
            ObjectAction::Fling { axis, fling } => {
                let vertical = json!(axis.is_vertical());
                match fling {
                    Fling::Forward => (method::FLING_FORWARD, vec![selector, vertical]),
                    Fling::Backward => (method::FLING_BACKWARD, vec![selector, vertical]),
                    Fling::ToBeginning { max_swipes } => (
                        method::FLING_TO_BEGINNING,
                        vec![selector, vertical, json!(max_swipes)],
                    ),
                    Fling::ToEnd { max_swipes } => (
                        method::FLING_TO_END,
                        vec![selector, vertical, json!(max_swipes)],
                    ),
                }
            }
            ObjectAction::Scroll { axis, scroll } => {
                let vertical = json!(axis.is_vertical());
                match scroll {
                    Scroll::Forward { steps } => (
                        method::SCROLL_FORWARD,
                        vec![selector, vertical, json!(steps)],
                    ),
                    Scroll::Backward { steps } => (
                        method::SCROLL_BACKWARD,
                        vec![selector, vertical, json!(steps)],
                    ),
                    Scroll::ToBeginning { steps, max_swipes } => (
                        method::SCROLL_TO_BEGINNING,
                        vec![selector, vertical, json!(max_swipes), json!(steps)],
                    ),
                    Scroll::ToEnd { steps, max_swipes } => (
                        method::SCROLL_TO_END,
                        vec![selector, vertical, json!(max_swipes), json!(steps)],
                    ),
                    Scroll::To(target) => (
                        method::SCROLL_TO,
                        vec![selector, target.build(), vertical],
                    ),
                }
            }
            ObjectAction::SetText(text) if text.is_empty() => {
                (method::CLEAR_TEXT_FIELD, vec![selector])
            }
            ObjectAction::SetText(text) => (method::SET_TEXT, vec![selector, json!(text)]),
            ObjectAction::ClearText => (method::CLEAR_TEXT_FIELD, vec![selector]),
            ObjectAction::Wait {
                condition,
                timeout_ms,
            } => {
                let name = match condition {
                    WaitCondition::Exists => method::WAIT_FOR_EXISTS,
                    WaitCondition::Gone => method::WAIT_UNTIL_GONE,
                };
                (name, vec![selector, json!(timeout_ms)])
            }
        }
    }
}

impl Fling {
    pub fn from_motion(motion: Motion, max_swipes: u32) -> Self {
        match motion {
            Motion::Forward => Fling::Forward,
            Motion::Backward => Fling::Backward,
            Motion::ToBeginning => Fling::ToBeginning { max_swipes },
            Motion::ToEnd => Fling::ToEnd { max_swipes },
        }
    }

    pub fn to_beginning() -> Self {
        Fling::ToBeginning {
            max_swipes: DEFAULT_MAX_SWIPES,
        }
    }

    pub fn to_end() -> Self {
        Fling::ToEnd {
            max_swipes: DEFAULT_MAX_SWIPES,
        }
    }
}

impl Scroll {
    pub fn from_motion(motion: Motion, steps: u32, max_swipes: u32) -> Self {
        match motion {
            Motion::Forward => Scroll::Forward { steps },
            Motion::Backward => Scroll::Backward { steps },
            Motion::ToBeginning => Scroll::ToBeginning { steps, max_swipes },
            Motion::ToEnd => Scroll::ToEnd { steps, max_swipes },
        }
    }

    pub fn forward() -> Self {
        Scroll::Forward {
            steps: DEFAULT_SCROLL_STEPS,
        }
    }

    pub fn backward() -> Self {
        Scroll::Backward {
            steps: DEFAULT_SCROLL_STEPS,
        }
    }

    pub fn to_beginning() -> Self {
        Scroll::ToBeginning {
            steps: DEFAULT_SCROLL_STEPS,
            max_swipes: DEFAULT_MAX_SWIPES,
        }
    }

    pub fn to_end() -> Self {
        Scroll::ToEnd {
            steps: DEFAULT_SCROLL_STEPS,
            max_swipes: DEFAULT_MAX_SWIPES,
        }
    }
}

/// The elements matched by one selector on a live device.
pub struct UiObject {
    channel: Arc<dyn RpcChannel>,
    selector: Selector,
    history: Vec<ObjectAction>,
}

impl UiObject {
    pub fn new(channel: Arc<dyn RpcChannel>, selector: Selector) -> Self {
        Self {
            channel,
            selector,
            history: Vec::new(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut Selector {
        &mut self.selector
    }

    /// Actions performed through this handle, oldest first.
    pub fn history(&self) -> &[ObjectAction] {
        &self.history
    }

    /// Narrow to a child matching `child`.
    pub fn child_selector(mut self, child: Selector) -> Self {
        self.selector = self.selector.child_selector(child);
        self
    }

    /// Narrow to a sibling found through the parent, matching `sibling`.
    pub fn from_parent(mut self, sibling: Selector) -> Self {
        self.selector = self.selector.from_parent(sibling);
        self
    }

    fn query(&self, name: &str) -> Result<Value, ApiError> {
        self.channel.call(name, vec![self.selector.build()])
    }

    pub fn exists(&self) -> Result<bool, ApiError> {
        rpc::decode(method::EXIST, self.query(method::EXIST)?)
    }

    pub fn info(&self) -> Result<ObjectInfo, ApiError> {
        rpc::decode(method::OBJ_INFO, self.query(method::OBJ_INFO)?)
    }

    /// Read one attribute from a fresh `objInfo`, honouring name aliases.
    pub fn attr(&self, name: &str) -> Result<Value, ApiError> {
        self.info()?
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::attribute_not_found(name))
    }

    /// Run `action` against the current selector and return the raw result.
    pub fn perform(&mut self, action: ObjectAction) -> Result<Value, ApiError> {
        self.dispatch(action).map(|(_, result)| result)
    }

    fn dispatch(&mut self, action: ObjectAction) -> Result<(&'static str, Value), ApiError> {
        let (name, params) = action.encode(self.selector.build());
        debug!("Element action {}", name);
        let result = self.channel.call(name, params)?;
        self.history.push(action);
        Ok((name, result))
    }

    fn perform_bool(&mut self, action: ObjectAction) -> Result<bool, ApiError> {
        let (name, result) = self.dispatch(action)?;
        rpc::decode(name, result)
    }

    pub fn click(&mut self) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::Click(None))
    }

    pub fn click_corner(&mut self, corner: Corner) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::Click(Some(corner)))
    }

    pub fn click_and_wait(&mut self, timeout_ms: u64) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::ClickAndWait { timeout_ms })
    }

    pub fn long_click(&mut self, corner: Option<Corner>) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::LongClick(corner))
    }

    /// Set the field text. Empty text clears the field.
    pub fn set_text(&mut self, text: &str) -> Result<bool, ApiError> {
        let result = self.perform(ObjectAction::SetText(text.to_string()))?;
        if text.is_empty() {
            return Ok(true);
        }
        rpc::decode(method::SET_TEXT, result)
    }

    pub fn clear_text(&mut self) -> Result<(), ApiError> {
        self.perform(ObjectAction::ClearText)?;
        Ok(())
    }

    pub fn swipe(&mut self, direction: Direction) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::swipe(direction))
    }

    pub fn fling(&mut self, axis: Axis, fling: Fling) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::Fling { axis, fling })
    }

    pub fn scroll(&mut self, axis: Axis, scroll: Scroll) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::Scroll { axis, scroll })
    }

    pub fn pinch(&mut self, direction: PinchDirection) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::pinch(direction))
    }

    pub fn wait(&mut self, condition: WaitCondition, timeout_ms: u64) -> Result<bool, ApiError> {
        self.perform_bool(ObjectAction::Wait {
            condition,
            timeout_ms,
        })
    }
}
