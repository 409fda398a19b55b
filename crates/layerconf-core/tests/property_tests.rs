#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::BTreeSet;

use common::{load, load_over, Color, Entries};
use layerconf_core::{
    Element, ElementType, PropertyDescriptor, PropertySchema, Result, SaveMode, ValueType,
};
use proptest::prelude::*;

/// `Color` with its properties declared in the opposite order
struct ColorReversed;

impl ElementType for ColorReversed {
    fn declare() -> Result<PropertySchema> {
        PropertySchema::builder("color")
            .property(PropertyDescriptor::new("foreground", ValueType::String).default_value("000000"))
            .property(PropertyDescriptor::new("background", ValueType::String).default_value("FFFFFF"))
            .build()
    }
}

fn color_xml(background: &Option<String>, foreground: &Option<String>) -> String {
    let mut xml = String::from("<color");
    if let Some(b) = background {
        xml.push_str(&format!(" background=\"{}\"", b));
    }
    if let Some(f) = foreground {
        xml.push_str(&format!(" foreground=\"{}\"", f));
    }
    xml.push_str("/>");
    xml
}

fn entries_keys(entries: &Element) -> Vec<String> {
    entries.keys().iter().map(ToString::to_string).collect()
}

fn hex_color() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[0-9A-F]{6}")
}

proptest! {
    #[test]
    fn prop_hash_ignores_declaration_order(
        background in hex_color(),
        foreground in hex_color(),
    ) {
        let xml = color_xml(&background, &foreground);
        let a = load::<Color>(&xml).unwrap();
        let b = load::<ColorReversed>(&xml).unwrap();
        prop_assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn prop_minimal_save_reproduces_layer(
        parent_bg in hex_color(),
        parent_fg in hex_color(),
        child_bg in hex_color(),
        child_fg in hex_color(),
    ) {
        let parent = load::<Color>(&color_xml(&parent_bg, &parent_fg)).unwrap();
        let child = load_over::<Color>(&parent, &color_xml(&child_bg, &child_fg)).unwrap();

        let saved = child.serialize("color", Some(&parent), SaveMode::Minimal).unwrap();
        let reloaded = match saved {
            Some(xml) => load_over::<Color>(&parent, &xml).unwrap(),
            None => {
                let mut fresh = Element::of::<Color>().unwrap();
                fresh.reset(Some(&parent)).unwrap();
                fresh
            }
        };

        for name in ["background", "foreground"] {
            prop_assert_eq!(reloaded.get(name).unwrap(), child.get(name).unwrap());
        }
    }

    #[test]
    fn prop_full_save_round_trips(
        background in hex_color(),
        foreground in hex_color(),
    ) {
        let original = load::<Color>(&color_xml(&background, &foreground)).unwrap();

        let mut unmerged = Element::of::<Color>().unwrap();
        unmerged.unmerge(&original, None, SaveMode::Full).unwrap();
        let xml = unmerged.serialize("color", None, SaveMode::Full).unwrap().unwrap();

        let reloaded = load::<Color>(&xml).unwrap();
        prop_assert_eq!(&reloaded, &original);
        prop_assert_eq!(
            Some(xml),
            original.serialize("color", None, SaveMode::Full).unwrap()
        );
    }

    #[test]
    fn prop_map_minimal_save_reproduces_items(
        parent_ids in proptest::collection::btree_set(0u8..6, 0..6),
        remove_mask in proptest::collection::vec(any::<bool>(), 6),
        added_ids in proptest::collection::btree_set(10u8..16, 0..4),
    ) {
        let mut machine_xml = String::from("<entries>");
        for id in &parent_ids {
            machine_xml.push_str(&format!("<add id=\"{}\" value=\"v{}\"/>", id, id));
        }
        machine_xml.push_str("</entries>");
        let parent = load::<Entries>(&machine_xml).unwrap();

        let removed: BTreeSet<u8> = parent_ids
            .iter()
            .copied()
            .filter(|id| remove_mask[usize::from(*id)])
            .collect();
        let mut app_xml = String::from("<entries>");
        for id in &removed {
            app_xml.push_str(&format!("<remove id=\"{}\"/>", id));
        }
        for id in &added_ids {
            app_xml.push_str(&format!("<add id=\"{}\" value=\"v{}\"/>", id, id));
        }
        app_xml.push_str("</entries>");
        let child = load_over::<Entries>(&parent, &app_xml).unwrap();

        let mut unmerged = Element::of::<Entries>().unwrap();
        unmerged.unmerge(&child, Some(&parent), SaveMode::Minimal).unwrap();
        let saved = unmerged.serialize("entries", Some(&parent), SaveMode::Minimal).unwrap();

        let reloaded = match saved {
            Some(xml) => load_over::<Entries>(&parent, &xml).unwrap(),
            None => {
                let mut fresh = Element::of::<Entries>().unwrap();
                fresh.reset(Some(&parent)).unwrap();
                fresh
            }
        };
        prop_assert_eq!(entries_keys(&reloaded), entries_keys(&child));
        prop_assert_eq!(&reloaded, &child);
    }
}
