//! DOM Node
//!
//! Arena node with sibling/child links stored as `NodeId` indices.

use crate::NodeId;
use crate::attributes::NamedNodeMap;

/// DOM node. Links are arena indices; `NodeId::NONE` means absent.
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element namespace. Dataset access is defined for HTML and SVG only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
    Other,
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name, lowercase
    tag: String,
    /// Namespace
    ns: Namespace,
    /// Attributes
    attrs: NamedNodeMap,
    /// Cached id attribute (very common lookup)
    id: Option<String>,
    /// Cached class list
    classes: Vec<String>,
    /// Inline style declarations, in declaration order
    style: Vec<(String, String)>,
    /// Current value, present only for form elements
    value: Option<String>,
    /// Checked state, present only for checkable elements
    checked: Option<bool>,
}

fn supports_value(tag: &str) -> bool {
    matches!(tag, "input" | "textarea" | "select" | "option")
}

fn supports_checked(tag: &str) -> bool {
    tag == "input"
}

impl ElementData {
    pub fn new(tag: &str, ns: Namespace) -> Self {
        let tag = tag.to_ascii_lowercase();
        let value = supports_value(&tag).then(String::new);
        let checked = supports_checked(&tag).then_some(false);
        Self {
            tag,
            ns,
            attrs: NamedNodeMap::new(),
            id: None,
            classes: Vec::new(),
            style: Vec::new(),
            value,
            checked,
        }
    }

    /// Tag name, lowercase
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn namespace(&self) -> Namespace {
        self.ns
    }

    /// Cached id attribute
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Cached class list
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Get an attribute value. `style` is served from the inline
    /// declarations so it never goes stale.
    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "style" {
            if self.style.is_empty() && !self.attrs.contains("style") {
                return None;
            }
            return Some(self.style_text());
        }
        self.attrs.get(name).map(|v| v.to_string())
    }

    /// Set an attribute, keeping the id/class/style caches coherent.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attrs.set(name, value);
        match name {
            "id" => self.id = Some(value.to_string()),
            "class" => {
                self.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => self.style = parse_style_text(value),
            "value" => {
                if self.value.is_some() {
                    self.value = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    /// Remove an attribute
    pub fn remove_attribute(&mut self, name: &str) {
        self.attrs.remove(name);
        match name {
            "id" => self.id = None,
            "class" => self.classes.clear(),
            "style" => self.style.clear(),
            _ => {}
        }
    }

    pub fn attributes(&self) -> &NamedNodeMap {
        &self.attrs
    }

    /// Add a class token (no-op if already present)
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        self.classes.push(class.to_string());
        self.sync_class_attr();
    }

    /// Remove a class token
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
        self.sync_class_attr();
    }

    /// Toggle a class token, returning whether it is now present
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    fn sync_class_attr(&mut self) {
        let text = self.classes.join(" ");
        self.attrs.set("class", &text);
    }

    /// Get an inline style property
    pub fn style_get(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set an inline style property. An empty value removes the declaration,
    /// as the style attribute API does.
    pub fn style_set(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.style.retain(|(p, _)| p != property);
        } else if let Some(decl) = self.style.iter_mut().find(|(p, _)| p == property) {
            decl.1 = value.to_string();
        } else {
            self.style.push((property.to_string(), value.to_string()));
        }
        let text = self.style_text();
        self.attrs.set("style", &text);
    }

    /// Serialized inline style text
    pub fn style_text(&self) -> String {
        self.style
            .iter()
            .map(|(p, v)| format!("{}: {};", p, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether this element can carry `data-*` values
    pub fn supports_dataset(&self) -> bool {
        matches!(self.ns, Namespace::Html | Namespace::Svg)
    }

    /// Current value, `None` when the element has no value semantics
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Set the current value; returns false when unsupported
    pub fn set_value(&mut self, value: &str) -> bool {
        if self.value.is_some() {
            self.value = Some(value.to_string());
            true
        } else {
            false
        }
    }

    /// Checked state, `None` when the element has no checked semantics
    pub fn checked(&self) -> Option<bool> {
        self.checked
    }

    /// Set the checked state; returns false when unsupported
    pub fn set_checked(&mut self, checked: bool) -> bool {
        if self.checked.is_some() {
            self.checked = Some(checked);
            true
        } else {
            false
        }
    }
}

fn parse_style_text(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            (!prop.is_empty() && !value.is_empty())
                .then(|| (prop.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_caches() {
        let mut elem = ElementData::new("DIV", Namespace::Html);
        assert_eq!(elem.tag(), "div");

        elem.set_attribute("id", "main");
        elem.set_attribute("class", "container  active");

        assert_eq!(elem.id(), Some("main"));
        assert!(elem.has_class("container"));
        assert!(elem.has_class("active"));

        elem.remove_attribute("class");
        assert!(!elem.has_class("container"));
    }

    #[test]
    fn test_class_ops_sync_attribute() {
        let mut elem = ElementData::new("p", Namespace::Html);
        elem.add_class("a");
        elem.add_class("b");
        elem.add_class("a");

        assert_eq!(elem.attribute("class").as_deref(), Some("a b"));

        assert!(!elem.toggle_class("b"));
        assert!(elem.toggle_class("c"));
        assert_eq!(elem.attribute("class").as_deref(), Some("a c"));
    }

    #[test]
    fn test_style_roundtrip() {
        let mut elem = ElementData::new("div", Namespace::Html);
        elem.set_attribute("style", "display: none; color: red");

        assert_eq!(elem.style_get("display"), Some("none"));
        assert_eq!(elem.style_get("color"), Some("red"));

        elem.style_set("display", "");
        assert_eq!(elem.style_get("display"), None);
        assert_eq!(elem.attribute("style").as_deref(), Some("color: red;"));
    }

    #[test]
    fn test_form_state_capability() {
        let mut input = ElementData::new("input", Namespace::Html);
        let mut div = ElementData::new("div", Namespace::Html);

        assert_eq!(input.checked(), Some(false));
        assert!(input.set_checked(true));
        assert_eq!(input.checked(), Some(true));

        assert_eq!(div.checked(), None);
        assert!(!div.set_checked(true));
        assert!(!div.set_value("x"));
        assert_eq!(input.value(), Some(""));
    }
}
