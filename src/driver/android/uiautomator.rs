//! UiAutomator hierarchy parsing
//!
//! Handles both `uiautomator dump` output (`<hierarchy><node .../></hierarchy>`)
//! and UiAutomator2 page source, where element tags are class names.

use crate::driver::elements::{ElementKind, ElementRect, SourceNode};
use crate::error::{RemoteError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Printed by uiautomator when the accessibility tree is momentarily unavailable
pub const NULL_ROOT_MARKER: &str = "null root node returned by UiTestAutomationBridge";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Parse bounds from string like "[0,0][1080,1920]"
    pub fn from_string(s: &str) -> Option<Self> {
        let (left_top, right_bottom) = s.split_once("][")?;
        let left_top = left_top.trim_start_matches('[');
        let right_bottom = right_bottom.trim_end_matches(']');

        let (left, top) = left_top.split_once(',')?;
        let (right, bottom) = right_bottom.split_once(',')?;

        Some(Bounds {
            left: left.trim().parse().ok()?,
            top: top.trim().parse().ok()?,
            right: right.trim().parse().ok()?,
            bottom: bottom.trim().parse().ok()?,
        })
    }

    pub fn to_rect(self) -> ElementRect {
        ElementRect {
            x: self.left,
            y: self.top,
            width: self.right.saturating_sub(self.left),
            height: self.bottom.saturating_sub(self.top),
        }
    }
}

/// Node of the Android view hierarchy
#[derive(Debug, Clone, Default)]
pub struct UiNode {
    pub class: String,
    pub text: String,
    pub resource_id: String,
    pub content_desc: String,
    pub hint: String,
    pub bounds: Bounds,
    /// `displayed` / `visible-to-user`; absent in plain dumps
    pub displayed: Option<bool>,
    pub focused: bool,
    pub children: Vec<UiNode>,
}

/// Map an Android widget class onto the reported element kinds
pub fn classify(class: &str) -> Option<ElementKind> {
    let short = class.rsplit('.').next().unwrap_or(class);
    match short {
        "SearchView$SearchAutoComplete" => Some(ElementKind::SearchField),
        "EditText" | "AutoCompleteTextView" | "MultiAutoCompleteTextView"
        | "TextInputEditText" => Some(ElementKind::TextField),
        "Button" | "ImageButton" | "RadioButton" | "MaterialButton"
        | "FloatingActionButton" => Some(ElementKind::Button),
        "Switch" | "SwitchCompat" | "SwitchMaterial" | "ToggleButton" | "CheckBox" => {
            Some(ElementKind::Switch)
        }
        "ActionMenuItemView" => Some(ElementKind::Icon),
        "TextView" | "CheckedTextView" => Some(ElementKind::StaticText),
        "ImageView" => Some(ElementKind::Image),
        _ => None,
    }
}

fn node_from_tag(tag: &BytesStart) -> UiNode {
    let mut node = UiNode {
        class: String::from_utf8_lossy(tag.name().as_ref()).to_string(),
        ..Default::default()
    };

    for attr in tag.attributes().filter_map(|a| a.ok()) {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map(|v| v.to_string())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());

        match key.as_str() {
            "class" => node.class = value,
            "text" => node.text = value,
            "resource-id" => node.resource_id = value,
            "content-desc" => node.content_desc = value,
            "hint" => node.hint = value,
            "bounds" => {
                if let Some(b) = Bounds::from_string(&value) {
                    node.bounds = b;
                }
            }
            "displayed" | "visible-to-user" => node.displayed = Some(value == "true"),
            "focused" => node.focused = value == "true",
            _ => {}
        }
    }

    node
}

fn attach(stack: &mut [UiNode], roots: &mut Vec<UiNode>, node: UiNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Parse hierarchy XML into a tree rooted at the document element
pub fn parse_hierarchy(xml: &str) -> Result<UiNode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<UiNode> = Vec::new();
    let mut roots: Vec<UiNode> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(node_from_tag(e)),
            Ok(Event::Empty(ref e)) => {
                let node = node_from_tag(e);
                attach(&mut stack, &mut roots, node);
            }
            Ok(Event::End(_)) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut roots, node);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(RemoteError::protocol(
                    "UI hierarchy",
                    format!("XML parse error at {}: {}", reader.buffer_position(), e),
                ))
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(RemoteError::protocol("UI hierarchy", "unterminated XML"));
    }

    roots
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::protocol("UI hierarchy", "empty document"))
}

/// Strip log lines uiautomator prints around the XML
pub fn trim_dump(dump: &str) -> Option<&str> {
    let start = dump.find('<')?;
    let end = dump.rfind('>')?;
    (end >= start).then(|| &dump[start..=end])
}

impl SourceNode for UiNode {
    fn kind(&self) -> Option<ElementKind> {
        classify(&self.class)
    }

    fn visible_flag(&self) -> bool {
        self.displayed.unwrap_or(true)
    }

    fn rect(&self) -> ElementRect {
        self.bounds.to_rect()
    }

    /// Accessibility description, falling back to the input hint
    fn label(&self) -> Option<&str> {
        [&self.content_desc, &self.hint]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
    }

    fn name(&self) -> Option<&str> {
        Some(self.text.as_str()).filter(|s| !s.is_empty())
    }

    /// Only editable fields carry a value
    fn value(&self) -> Option<&str> {
        match self.kind() {
            Some(ElementKind::TextField) | Some(ElementKind::SearchField) => self.name(),
            _ => None,
        }
    }

    fn identifier(&self) -> Option<&str> {
        Some(self.resource_id.as_str()).filter(|s| !s.is_empty())
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
