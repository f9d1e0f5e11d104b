//! WebDriverAgent page source (`/source?format=json`)

use crate::driver::elements::{ElementKind, ElementRect, SourceNode};
use serde::Deserialize;

/// Frame of a source tree element. WDA reports points as floats.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SourceTreeRect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// `isVisible` arrives as "0"/"1" from WDA and as a boolean from some builds
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VisibilityFlag {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl VisibilityFlag {
    pub fn is_set(&self) -> bool {
        match self {
            Self::Flag(visible) => *visible,
            Self::Number(n) => *n == 1,
            Self::Text(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        }
    }
}

/// Node of the WDA accessibility tree
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SourceTreeElement {
    /// Element type, e.g. "Button" or "XCUIElementTypeButton"
    #[serde(rename = "type", default)]
    pub element_type: String,

    #[serde(default)]
    pub rect: SourceTreeRect,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(rename = "rawIdentifier", default)]
    pub raw_identifier: Option<String>,

    #[serde(rename = "isVisible", default)]
    pub is_visible: Option<VisibilityFlag>,

    #[serde(default)]
    pub children: Vec<SourceTreeElement>,
}

impl SourceNode for SourceTreeElement {
    fn kind(&self) -> Option<ElementKind> {
        let name = self
            .element_type
            .strip_prefix("XCUIElementType")
            .unwrap_or(&self.element_type);
        ElementKind::from_name(name)
    }

    /// A missing flag counts as hidden
    fn visible_flag(&self) -> bool {
        self.is_visible.as_ref().is_some_and(VisibilityFlag::is_set)
    }

    fn rect(&self) -> ElementRect {
        ElementRect {
            x: self.rect.x.floor() as i32,
            y: self.rect.y.floor() as i32,
            width: self.rect.width as i32,
            height: self.rect.height as i32,
        }
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn identifier(&self) -> Option<&str> {
        self.raw_identifier.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::elements::normalize;

    const SOURCE: &str = r#"{
        "type": "Application",
        "label": "Settings",
        "isVisible": "1",
        "rect": {"x": 0, "y": 0, "width": 390, "height": 844},
        "children": [
            {
                "type": "Window",
                "isVisible": "1",
                "rect": {"x": 0, "y": 0, "width": 390, "height": 844},
                "children": [
                    {"type": "StaticText", "label": "General", "isVisible": "1",
                     "rect": {"x": 16, "y": 100, "width": 200, "height": 22}},
                    {"type": "Button", "name": "Back", "isVisible": "1",
                     "rect": {"x": -1, "y": 40, "width": 44, "height": 44}},
                    {"type": "Button", "isVisible": "1",
                     "rect": {"x": 300, "y": 40, "width": 44, "height": 44}},
                    {"type": "XCUIElementTypeSwitch", "rawIdentifier": "wifi", "value": "1",
                     "isVisible": true, "rect": {"x": 320.5, "y": 200, "width": 51, "height": 31}},
                    {"type": "TextField", "label": "Search", "isVisible": "0",
                     "rect": {"x": 16, "y": 60, "width": 358, "height": 36}}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_normalize_wda_source() {
        let root: SourceTreeElement = serde_json::from_str(SOURCE).unwrap();
        assert_eq!(root.children[0].children.len(), 5);

        let elements = normalize(&root);
        assert_eq!(elements.len(), 2);

        assert_eq!(elements[0].element_type, "StaticText");
        assert_eq!(elements[0].label.as_deref(), Some("General"));
        assert_eq!(elements[0].rect.y, 100);

        assert_eq!(elements[1].element_type, "Switch");
        assert_eq!(elements[1].identifier.as_deref(), Some("wifi"));
        assert_eq!(elements[1].value.as_deref(), Some("1"));
        assert_eq!(elements[1].rect.x, 320);
    }

    #[test]
    fn test_visibility_flag_forms() {
        assert!(VisibilityFlag::Text("1".into()).is_set());
        assert!(!VisibilityFlag::Text("0".into()).is_set());
        assert!(VisibilityFlag::Flag(true).is_set());
        assert!(VisibilityFlag::Number(1).is_set());
        assert!(!SourceTreeElement::default().visible_flag());
    }
}
