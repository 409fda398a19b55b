//! Owned XML node tree read and written with quick-xml
//!
//! Only elements and attributes matter to configuration layers. Text,
//! comments, CDATA, declarations and processing instructions are skipped.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::errors::{ConfigError, Location, Result};

/// One XML element with its attributes and child elements
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub location: Location,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Parse the single root element of `source`
    ///
    /// # Errors
    ///
    /// Returns `XmlSyntax` with the line and column of malformed input, a
    /// missing root, or content after the root element.
    pub fn parse(source: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                let offset = usize::try_from(reader.error_position()).unwrap_or(usize::MAX);
                syntax(source, offset, e.to_string())
            })?;
            let end = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);

            match event {
                Event::Start(ref e) => {
                    let start = end.saturating_sub(e.len() + 2);
                    if root.is_some() {
                        return Err(syntax(source, start, "content after the root element"));
                    }
                    stack.push(open_node(source, e, start)?);
                }
                Event::Empty(ref e) => {
                    let start = end.saturating_sub(e.len() + 3);
                    if root.is_some() {
                        return Err(syntax(source, start, "content after the root element"));
                    }
                    let node = open_node(source, e, start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
                Event::End(_) => {
                    let Some(node) = stack.pop() else {
                        return Err(syntax(source, end, "unexpected closing tag"));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ConfigError::XmlSyntax {
                message: format!("element '{}' is never closed", open.name),
                location: open.location,
            });
        }
        root.ok_or_else(|| syntax(source, source.len(), "document has no root element"))
    }

    /// Write this node without indentation
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the writer fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner().into_inner()).map_err(|e| {
            ConfigError::Serialization {
                message: e.to_string(),
            }
        })
    }

    fn write(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attributes {
            start.push_attribute((k.as_str(), v.as_str()));
        }

        if self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(serialization)?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(serialization)?;
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(serialization)?;
        Ok(())
    }
}

fn open_node(source: &str, e: &BytesStart<'_>, offset: usize) -> Result<XmlNode> {
    let location = Location::from_offset(source, offset);
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| ConfigError::XmlSyntax {
            message: err.to_string(),
            location,
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ConfigError::XmlSyntax {
                message: err.to_string(),
                location,
            })?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlNode {
        name,
        attributes,
        children: Vec::new(),
        location,
    })
}

fn syntax(source: &str, offset: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::XmlSyntax {
        message: message.into(),
        location: Location::from_offset(source, offset),
    }
}

fn serialization(e: impl std::fmt::Display) -> ConfigError {
    ConfigError::Serialization {
        message: e.to_string(),
    }
}
