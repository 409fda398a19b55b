//! Attribute and element locks
//!
//! A layer locks names of its own element against redefinition in child
//! layers. Each axis (attributes, child elements) has a deny list
//! (`lockAttributes`, `lockElements`) and an allow-only list
//! (`lockAllAttributesExcept`, `lockAllElementsExcept`). When both are
//! declared on one element the allow-only list governs.

pub const LOCK_ATTRIBUTES: &str = "lockAttributes";
pub const LOCK_ELEMENTS: &str = "lockElements";
pub const LOCK_ALL_ATTRIBUTES_EXCEPT: &str = "lockAllAttributesExcept";
pub const LOCK_ALL_ELEMENTS_EXCEPT: &str = "lockAllElementsExcept";
pub const LOCK_ITEM: &str = "lockItem";

/// Deny list plus optional allow-only list for one axis
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockSet {
    deny: Vec<String>,
    allow_only: Option<Vec<String>>,
}

impl LockSet {
    pub fn is_empty(&self) -> bool {
        self.deny.is_empty() && self.allow_only.is_none()
    }

    /// Whether `name` may not be redefined below this layer.
    pub fn is_locked(&self, name: &str) -> bool {
        match &self.allow_only {
            Some(allowed) => !allowed.iter().any(|a| a == name),
            None => self.deny.iter().any(|d| d == "*" || d == name),
        }
    }

    pub fn deny(&mut self, names: &str) {
        self.deny = parse_list(names);
    }

    pub fn allow_only(&mut self, names: &str) {
        self.allow_only = Some(parse_list(names));
    }

    pub fn denied(&self) -> &[String] {
        &self.deny
    }

    pub fn allowed(&self) -> Option<&[String]> {
        self.allow_only.as_deref()
    }
}

/// Locks declared by one element in one layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Locks {
    pub attributes: LockSet,
    pub elements: LockSet,
}

impl Locks {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.elements.is_empty()
    }

    /// Apply a reserved lock attribute. Returns false for any other name.
    pub(crate) fn apply(&mut self, name: &str, value: &str) -> bool {
        match name {
            LOCK_ATTRIBUTES => self.attributes.deny(value),
            LOCK_ELEMENTS => self.elements.deny(value),
            LOCK_ALL_ATTRIBUTES_EXCEPT => self.attributes.allow_only(value),
            LOCK_ALL_ELEMENTS_EXCEPT => self.elements.allow_only(value),
            _ => return false,
        }
        true
    }

    /// Reserved attributes that reproduce these locks.
    pub(crate) fn to_attributes(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if !self.attributes.deny.is_empty() {
            out.push((LOCK_ATTRIBUTES, self.attributes.deny.join(",")));
        }
        if let Some(allowed) = &self.attributes.allow_only {
            out.push((LOCK_ALL_ATTRIBUTES_EXCEPT, allowed.join(",")));
        }
        if !self.elements.deny.is_empty() {
            out.push((LOCK_ELEMENTS, self.elements.deny.join(",")));
        }
        if let Some(allowed) = &self.elements.allow_only {
            out.push((LOCK_ALL_ELEMENTS_EXCEPT, allowed.join(",")));
        }
        out
    }
}

/// Parse a `lockItem` value.
pub(crate) fn parse_lock_item(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_list(names: &str) -> Vec<String> {
    names
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_list() {
        let mut locks = Locks::default();
        assert!(locks.apply(LOCK_ATTRIBUTES, " size , name,"));
        assert!(locks.attributes.is_locked("size"));
        assert!(locks.attributes.is_locked("name"));
        assert!(!locks.attributes.is_locked("color"));
        assert!(!locks.elements.is_locked("size"));
    }

    #[test]
    fn test_star_locks_everything() {
        let mut set = LockSet::default();
        set.deny("*");
        assert!(set.is_locked("anything"));
    }

    #[test]
    fn test_allow_only_wins_over_deny() {
        let mut locks = Locks::default();
        locks.apply(LOCK_ATTRIBUTES, "a");
        locks.apply(LOCK_ALL_ATTRIBUTES_EXCEPT, "a");
        assert!(!locks.attributes.is_locked("a"));
        assert!(locks.attributes.is_locked("b"));
    }

    #[test]
    fn test_empty_allow_only_locks_all() {
        let mut locks = Locks::default();
        locks.apply(LOCK_ALL_ELEMENTS_EXCEPT, "");
        assert!(locks.elements.is_locked("font"));
        assert!(!locks.is_empty());
    }

    #[test]
    fn test_to_attributes_round_trip() {
        let mut locks = Locks::default();
        locks.apply(LOCK_ELEMENTS, "font, color");
        let attrs = locks.to_attributes();
        assert_eq!(attrs, vec![(LOCK_ELEMENTS, "font,color".to_string())]);
        assert!(!locks.apply("xmlns", "urn:x"));
    }

    #[test]
    fn test_parse_lock_item() {
        assert!(parse_lock_item("TRUE"));
        assert!(!parse_lock_item("no"));
    }
}
