//! Tag filtering and entry cloning.
//!
//! One pre-order walk over the source tree. The per-entry decision is a pure
//! function so it can be tested without a persistence-capable database; the
//! apply phase clones and optionally redacts.

use std::collections::HashSet;

use keepass::db::{Entry, Group, Node, Value};
use uuid::Uuid;

use crate::config::{CONFIG_ENTRY_TITLE, OTP_SECRET_FIELD, TOTP_REMOVED_MARKER};

/// Verdict of the decision phase for one visited entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDecision {
    /// Entry belongs to the export set.
    pub include: bool,
    /// Custom icon the entry references, harvested whether or not the entry
    /// is included.
    pub icon: Option<Uuid>,
}

/// Everything the assembler needs: clones in traversal order plus the custom
/// icon UUIDs the destination must carry (first-seen order, deduplicated).
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub entries: Vec<Entry>,
    pub icons: Vec<Uuid>,
}

/// Decide whether `entry` is exported and which icon it pins.
///
/// Inclusion requires a non-empty intersection between the entry's tags and
/// `tags`, and a title different from the reserved configuration title: the
/// configuration entry is never exported, even when it matches the filter.
/// Icons are reported for every entry, included or not, so the destination
/// never ends up with dangling icon references.
pub fn decide(entry: &Entry, tags: &[String]) -> EntryDecision {
    let tagged = entry
        .tags
        .iter()
        .any(|tag| tags.iter().any(|wanted| wanted == tag));
    let is_config = entry.get_title() == Some(CONFIG_ENTRY_TITLE);

    EntryDecision {
        include: tagged && !is_config,
        icon: entry.custom_icon_uuid,
    }
}

/// Deep-clone `entry` for the destination database.
///
/// The clone keeps its UUID and history; the source entry is never touched.
/// With `clear_totp` set and a TOTP secret present, the secret field is
/// removed and [`TOTP_REMOVED_MARKER`] is appended to a non-empty title,
/// preserving the title's protected/plain classification. An empty title
/// stays empty so a deliberately blank entry does not grow a marker.
pub fn clone_for_export(entry: &Entry, clear_totp: bool) -> Entry {
    let mut clone = entry.clone();
    if clear_totp && clone.fields.remove(OTP_SECRET_FIELD).is_some() {
        mark_totp_removed(&mut clone);
    }
    clone
}

fn mark_totp_removed(entry: &mut Entry) {
    let title = match entry.fields.get("Title") {
        Some(Value::Unprotected(text)) if !text.is_empty() => Some((text.clone(), false)),
        Some(Value::Protected(text)) => match std::str::from_utf8(text.unsecure()) {
            Ok(text) if !text.is_empty() => Some((text.to_string(), true)),
            _ => None,
        },
        _ => None,
    };

    if let Some((text, protected)) = title {
        let marked = format!("{text}{TOTP_REMOVED_MARKER}");
        let value = if protected {
            Value::Protected(marked.as_bytes().into())
        } else {
            Value::Unprotected(marked)
        };
        entry.fields.insert("Title".to_string(), value);
    }
}

/// Walk the whole tree pre-order, visiting every entry exactly once, and
/// clone the export set.
pub fn filter_and_clone(root: &Group, tags: &[String], clear_totp: bool) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    let mut seen_icons = HashSet::new();
    walk(root, tags, clear_totp, &mut outcome, &mut seen_icons);
    outcome
}

fn walk(
    group: &Group,
    tags: &[String],
    clear_totp: bool,
    outcome: &mut FilterOutcome,
    seen_icons: &mut HashSet<Uuid>,
) {
    for node in &group.children {
        match node {
            Node::Entry(entry) => {
                let decision = decide(entry, tags);
                if let Some(icon) = decision.icon {
                    if seen_icons.insert(icon) {
                        outcome.icons.push(icon);
                    }
                }
                if decision.include {
                    outcome.entries.push(clone_for_export(entry, clear_totp));
                }
            }
            Node::Group(child) => walk(child, tags, clear_totp, outcome, seen_icons),
        }
    }
}
