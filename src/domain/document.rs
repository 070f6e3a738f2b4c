//! Minimal document tree the renderer writes into and the CLI serializes.

use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

const VOID_TAGS: &[&str] = &["img", "meta", "link", "br", "hr", "input"];

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_class(self, class: &str) -> Self {
        self.with_attr("class", class)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.append(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Concatenated text of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| match child {
            Node::Element(element) => element.find_by_id_mut(id),
            Node::Text(_) => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&escape_text(text)),
                Node::Element(element) => element.write_html(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// A page shell holding a single container the renderer targets.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    body: Element,
}

impl Document {
    pub fn with_container(title: &str, container_id: &str) -> Self {
        let body = Element::new("body")
            .with_child(Element::new("h1").with_text(title))
            .with_child(Element::new("div").with_attr("id", container_id));
        Self {
            title: title.to_string(),
            body,
        }
    }

    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_by_id_mut(id)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        let _ = writeln!(out, "<title>{}</title>", escape_text(&self.title));
        out.push_str("</head>\n");
        out.push_str(&self.body.to_html());
        out.push_str("\n</html>\n");
        out
    }
}

fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_attr(raw: &str) -> String {
    escape_text(raw).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_nested_elements() {
        let card = Element::new("div")
            .with_class("ticket")
            .with_child(Element::new("h2").with_text("Bug A"))
            .with_child(Element::new("img").with_attr("src", "http://x/img.png"));
        assert_eq!(
            card.to_html(),
            "<div class=\"ticket\"><h2>Bug A</h2><img src=\"http://x/img.png\"></div>"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let element = Element::new("p")
            .with_attr("title", "say \"hi\" & <bye>")
            .with_text("<script>alert(1)</script>");
        assert_eq!(
            element.to_html(),
            "<p title=\"say &quot;hi&quot; &amp; &lt;bye&gt;\">&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn finds_container_by_id() {
        let mut document = Document::with_container("Tickets", "tickets");
        let container = document.get_element_by_id_mut("tickets").unwrap();
        container.append(Element::new("p").with_text("hello"));
        assert!(document.get_element_by_id_mut("missing").is_none());
        assert!(document.to_html().contains("<div id=\"tickets\"><p>hello</p></div>"));
    }

    #[test]
    fn set_attr_replaces_existing_value() {
        let mut element = Element::new("div").with_class("a");
        element.set_attr("class", "b c");
        assert_eq!(element.attr("class"), Some("b c"));
        assert!(element.has_class("c"));
        assert!(!element.has_class("a"));
    }

    #[test]
    fn text_content_walks_descendants() {
        let element = Element::new("div")
            .with_child(Element::new("h2").with_text("Title"))
            .with_text(" and ")
            .with_child(Element::new("p").with_text("body"));
        assert_eq!(element.text_content(), "Title and body");
    }
}
