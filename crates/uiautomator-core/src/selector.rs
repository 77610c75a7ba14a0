//! Selector encoding.
//!
//! A [`Selector`] is a sparse set of match criteria. Building it produces the
//! plain JSON object the on-device server expects: every known field (unset
//! ones as their default) plus a `mask` recording which fields were
//! explicitly assigned.
//!
//! ```ignore
//! let sel = Selector::new().class_name("android.widget.Button").text("OK");
//! assert_eq!(sel.mask(), Field::Text.bit() | Field::ClassName.bit());
//! ```
//!
//! Presence, not value, drives the mask: assigning a field its own default
//! still sets the bit. Use [`Selector::delete`] to clear a field.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key of the presence mask in a built selector.
pub const MASK_KEY: &str = "mask";

/// A selector criterion. The discriminant is the field's presence bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u64)]
pub enum Field {
    Text = 0x01,
    TextContains = 0x02,
    TextMatches = 0x04,
    TextStartsWith = 0x08,
    ClassName = 0x10,
    ClassNameMatches = 0x20,
    Description = 0x40,
    DescriptionContains = 0x80,
    DescriptionMatches = 0x0100,
    DescriptionStartsWith = 0x0200,
    Checkable = 0x0400,
    Checked = 0x0800,
    Clickable = 0x1000,
    LongClickable = 0x2000,
    Scrollable = 0x4000,
    Enabled = 0x8000,
    Focusable = 0x01_0000,
    Focused = 0x02_0000,
    Selected = 0x04_0000,
    PackageName = 0x08_0000,
    PackageNameMatches = 0x10_0000,
    ResourceId = 0x20_0000,
    ResourceIdMatches = 0x40_0000,
    Index = 0x80_0000,
    Instance = 0x0100_0000,
    FromParent = 0x0200_0000,
    ChildSelector = 0x0400_0000,
}

/// What kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// String criteria, default unset.
    Text,
    /// Boolean state flags, default `false`.
    Flag,
    /// Non-negative integers, default `0`.
    Number,
    /// Nested selector, default unset.
    Selector,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Flag => "a boolean",
            FieldKind::Number => "a non-negative integer",
            FieldKind::Selector => "a nested selector",
        }
    }
}

impl Field {
    pub const ALL: [Field; 27] = [
        Field::Text,
        Field::TextContains,
        Field::TextMatches,
        Field::TextStartsWith,
        Field::ClassName,
        Field::ClassNameMatches,
        Field::Description,
        Field::DescriptionContains,
        Field::DescriptionMatches,
        Field::DescriptionStartsWith,
        Field::Checkable,
        Field::Checked,
        Field::Clickable,
        Field::LongClickable,
        Field::Scrollable,
        Field::Enabled,
        Field::Focusable,
        Field::Focused,
        Field::Selected,
        Field::PackageName,
        Field::PackageNameMatches,
        Field::ResourceId,
        Field::ResourceIdMatches,
        Field::Index,
        Field::Instance,
        Field::FromParent,
        Field::ChildSelector,
    ];

    pub const fn bit(self) -> u64 {
        self as u64
    }

    /// Wire name of the field.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Text => "text",
            Field::TextContains => "textContains",
            Field::TextMatches => "textMatches",
            Field::TextStartsWith => "textStartsWith",
            Field::ClassName => "className",
            Field::ClassNameMatches => "classNameMatches",
            Field::Description => "description",
            Field::DescriptionContains => "descriptionContains",
            Field::DescriptionMatches => "descriptionMatches",
            Field::DescriptionStartsWith => "descriptionStartsWith",
            Field::Checkable => "checkable",
            Field::Checked => "checked",
            Field::Clickable => "clickable",
            Field::LongClickable => "longClickable",
            Field::Scrollable => "scrollable",
            Field::Enabled => "enabled",
            Field::Focusable => "focusable",
            Field::Focused => "focused",
            Field::Selected => "selected",
            Field::PackageName => "packageName",
            Field::PackageNameMatches => "packageNameMatches",
            Field::ResourceId => "resourceId",
            Field::ResourceIdMatches => "resourceIdMatches",
            Field::Index => "index",
            Field::Instance => "instance",
            Field::FromParent => "fromParent",
            Field::ChildSelector => "childSelector",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Field::Checkable
            | Field::Checked
            | Field::Clickable
            | Field::LongClickable
            | Field::Scrollable
            | Field::Enabled
            | Field::Focusable
            | Field::Focused
            | Field::Selected => FieldKind::Flag,
            Field::Index | Field::Instance => FieldKind::Number,
            Field::FromParent | Field::ChildSelector => FieldKind::Selector,
            _ => FieldKind::Text,
        }
    }

    pub fn default_value(self) -> FieldValue {
        match self.kind() {
            FieldKind::Text | FieldKind::Selector => FieldValue::Unset,
            FieldKind::Flag => FieldValue::Bool(false),
            FieldKind::Number => FieldValue::Int(0),
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.name()).collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ApiError::invalid_field(s, &Self::names()))
    }
}

/// Value of a single criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Unset,
    Text(String),
    Bool(bool),
    Int(u32),
    Selector(Box<Selector>),
}

impl FieldValue {
    /// Parse a raw string into the value kind `field` expects.
    ///
    /// Nested selectors cannot be expressed as a single string.
    pub fn parse(field: Field, raw: &str) -> Result<Self, ApiError> {
        let kind = field.kind();
        match kind {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Flag => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(FieldValue::Bool(true)),
                "false" | "0" | "no" => Ok(FieldValue::Bool(false)),
                _ => Err(ApiError::invalid_field_value(field.name(), kind.describe(), raw)),
            },
            FieldKind::Number => raw
                .parse::<u32>()
                .map(FieldValue::Int)
                .map_err(|_| ApiError::invalid_field_value(field.name(), kind.describe(), raw)),
            FieldKind::Selector => Err(ApiError::invalid_field_value(
                field.name(),
                kind.describe(),
                raw,
            )),
        }
    }

    fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Unset, FieldKind::Text | FieldKind::Selector)
                | (FieldValue::Text(_), FieldKind::Text)
                | (FieldValue::Bool(_), FieldKind::Flag)
                | (FieldValue::Int(_), FieldKind::Number)
                | (FieldValue::Selector(_), FieldKind::Selector)
        )
    }

    fn describe(&self) -> String {
        match self {
            FieldValue::Unset => "unset".to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Selector(_) => "<selector>".to_string(),
        }
    }

    /// Plain JSON form. Nested selectors are built recursively.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Unset => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Selector(sel) => sel.build(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i)
    }
}

impl From<Selector> for FieldValue {
    fn from(sel: Selector) -> Self {
        FieldValue::Selector(Box::new(sel))
    }
}

/// A set of UI match criteria with a presence mask.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    values: BTreeMap<Field, FieldValue>,
    mask: u64,
}

macro_rules! text_criteria {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(mut self, value: impl Into<String>) -> Self {
                self.assign(Field::$field, FieldValue::Text(value.into()));
                self
            }
        )*
    };
}

macro_rules! flag_criteria {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(mut self, value: bool) -> Self {
                self.assign(Field::$field, FieldValue::Bool(value));
                self
            }
        )*
    };
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selector from `(name, value)` pairs, rejecting unknown names.
    pub fn from_criteria<I, K, V>(criteria: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut sel = Self::new();
        for (name, value) in criteria {
            sel.set_named(name.as_ref(), value)?;
        }
        Ok(sel)
    }

    /// Parse `field=value` criteria, as given on the command line.
    pub fn parse_criteria<I, S>(criteria: I) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sel = Self::new();
        for criterion in criteria {
            let criterion = criterion.as_ref();
            let Some((name, raw)) = criterion.split_once('=') else {
                return Err(ApiError::invalid_field_value(
                    criterion,
                    "a field=value pair",
                    criterion,
                ));
            };
            let field: Field = name.trim().parse()?;
            sel.set(field, FieldValue::parse(field, raw)?)?;
        }
        Ok(sel)
    }

    /// Assign `field`, setting its presence bit.
    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) -> Result<(), ApiError> {
        let value = value.into();
        if !value.fits(field.kind()) {
            return Err(ApiError::invalid_field_value(
                field.name(),
                field.kind().describe(),
                &value.describe(),
            ));
        }
        self.assign(field, value);
        Ok(())
    }

    /// Assign a field by wire name.
    pub fn set_named(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), ApiError> {
        let field: Field = name.parse()?;
        self.set(field, value)
    }

    /// Reset `field` to its default and clear its presence bit.
    pub fn delete(&mut self, field: Field) {
        self.values.remove(&field);
        self.mask &= !field.bit();
    }

    fn assign(&mut self, field: Field, value: FieldValue) {
        self.values.insert(field, value);
        self.mask |= field.bit();
    }

    /// The explicitly assigned value, if any.
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// The current value, falling back to the field default.
    pub fn value(&self, field: Field) -> FieldValue {
        self.values
            .get(&field)
            .cloned()
            .unwrap_or_else(|| field.default_value())
    }

    pub fn is_set(&self, field: Field) -> bool {
        self.mask & field.bit() != 0
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Produce the wire form: every field plus `mask`, nested selectors built.
    ///
    /// The result shares nothing with `self`; later mutation of the selector
    /// does not affect it.
    pub fn build(&self) -> Value {
        let mut out = Map::with_capacity(Field::ALL.len() + 1);
        for field in Field::ALL {
            let value = match self.values.get(&field) {
                Some(v) => v.to_json(),
                None => field.default_value().to_json(),
            };
            out.insert(field.name().to_string(), value);
        }
        out.insert(MASK_KEY.to_string(), Value::from(self.mask));
        Value::Object(out)
    }

    text_criteria! {
        text => Text,
        text_contains => TextContains,
        text_matches => TextMatches,
        text_starts_with => TextStartsWith,
        class_name => ClassName,
        class_name_matches => ClassNameMatches,
        description => Description,
        description_contains => DescriptionContains,
        description_matches => DescriptionMatches,
        description_starts_with => DescriptionStartsWith,
        package_name => PackageName,
        package_name_matches => PackageNameMatches,
        resource_id => ResourceId,
        resource_id_matches => ResourceIdMatches,
    }

    flag_criteria! {
        checkable => Checkable,
        checked => Checked,
        clickable => Clickable,
        long_clickable => LongClickable,
        scrollable => Scrollable,
        enabled => Enabled,
        focusable => Focusable,
        focused => Focused,
        selected => Selected,
    }

    pub fn index(mut self, value: u32) -> Self {
        self.assign(Field::Index, FieldValue::Int(value));
        self
    }

    pub fn instance(mut self, value: u32) -> Self {
        self.assign(Field::Instance, FieldValue::Int(value));
        self
    }

    /// Match relative to the parent of the element matched by `parent`.
    pub fn from_parent(mut self, parent: Selector) -> Self {
        self.assign(Field::FromParent, parent.into());
        self
    }

    /// Match a descendant of the element matched by `self`.
    pub fn child_selector(mut self, child: Selector) -> Self {
        self.assign(Field::ChildSelector, child.into());
        self
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.build().serialize(serializer)
    }
}
