//! The in-database configuration entry and its extraction.
//!
//! Export parameters live inside the source database itself, carried by a
//! single entry with a reserved title. The entry's password becomes the
//! destination credential, its tags select what gets exported, its URL may
//! override the destination path, and the presence of a reserved custom
//! field switches on TOTP-secret clearing.

use keepass::db::{Entry, Group, Node};
use keepass::Database;

/// Title of the entry that carries the export parameters.
pub const CONFIG_ENTRY_TITLE: &str = "PartialExportConfig";

/// Custom field whose presence (value ignored) enables TOTP clearing.
pub const CLEAR_TOTP_FIELD: &str = "ClearTotp";

/// Field holding the TOTP seed, as written by the KeeOtp family of plugins.
/// This is the field removed from exported clones.
pub const OTP_SECRET_FIELD: &str = "otp";

/// Appended to a clone's title after its TOTP secret was removed.
pub const TOTP_REMOVED_MARKER: &str = " [2FA removed]";

/// Export parameters read from the configuration entry.
///
/// Rebuilt from the live entry on every run and dropped afterwards; nothing
/// here is persisted separately.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Credential for the destination database.
    pub password: String,
    /// Tags selecting which entries are exported, in stored order.
    pub tags: Vec<String>,
    /// Strip TOTP secrets from exported clones.
    pub clear_totp: bool,
    /// Optional destination override taken from the entry's URL field.
    pub path_hint: Option<String>,
}

/// Find the configuration entry and extract its parameters.
///
/// Returns `None` when the database carries no export configuration: zero or
/// several entries with the reserved title, or a single one without tags.
/// None of these are errors; most databases are simply not set up for export.
pub fn locate_config(db: &Database) -> Option<ExportConfig> {
    let mut matches = Vec::new();
    collect_titled(&db.root, CONFIG_ENTRY_TITLE, &mut matches);

    if matches.len() != 1 {
        if matches.len() > 1 {
            tracing::warn!(
                count = matches.len(),
                "multiple configuration entries found, skipping export"
            );
        }
        return None;
    }

    let entry = matches[0];
    if entry.tags.is_empty() {
        tracing::info!("configuration entry has no tags, skipping export");
        return None;
    }

    let path_hint = entry
        .get("URL")
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Some(ExportConfig {
        password: entry.get("Password").unwrap_or_default().to_string(),
        tags: entry.tags.clone(),
        clear_totp: entry.fields.contains_key(CLEAR_TOTP_FIELD),
        path_hint,
    })
}

/// Collect every entry in the tree whose title matches exactly.
fn collect_titled<'a>(group: &'a Group, title: &str, found: &mut Vec<&'a Entry>) {
    for node in &group.children {
        match node {
            Node::Entry(entry) => {
                if entry.get_title() == Some(title) {
                    found.push(entry);
                }
            }
            Node::Group(child) => collect_titled(child, title, found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepass::config::DatabaseConfig;
    use keepass::db::Value;

    fn database_with(entries: Vec<Entry>) -> Database {
        let mut db = Database::new(DatabaseConfig::default());
        for entry in entries {
            db.root.children.push(Node::Entry(entry));
        }
        db
    }

    fn config_entry(tags: &[&str]) -> Entry {
        let mut entry = Entry::new();
        entry.fields.insert(
            "Title".to_string(),
            Value::Unprotected(CONFIG_ENTRY_TITLE.to_string()),
        );
        entry.fields.insert(
            "Password".to_string(),
            Value::Protected("export-secret".as_bytes().into()),
        );
        entry.tags = tags.iter().map(|t| t.to_string()).collect();
        entry
    }

    #[test]
    fn single_config_entry_is_extracted() {
        let mut entry = config_entry(&["work", "shared"]);
        entry
            .fields
            .insert("URL".to_string(), Value::Unprotected("out/backup".to_string()));
        let db = database_with(vec![entry]);

        let config = locate_config(&db).unwrap();
        assert_eq!(config.password, "export-secret");
        assert_eq!(config.tags, vec!["work", "shared"]);
        assert!(!config.clear_totp);
        assert_eq!(config.path_hint.as_deref(), Some("out/backup"));
    }

    #[test]
    fn config_entry_is_found_in_nested_groups() {
        let mut db = Database::new(DatabaseConfig::default());
        let mut inner = Group::new("Settings");
        inner.children.push(Node::Entry(config_entry(&["work"])));
        let mut outer = Group::new("Meta");
        outer.children.push(Node::Group(inner));
        db.root.children.push(Node::Group(outer));

        assert!(locate_config(&db).is_some());
    }

    #[test]
    fn missing_config_entry_yields_none() {
        let mut other = Entry::new();
        other.fields.insert(
            "Title".to_string(),
            Value::Unprotected("Mail account".to_string()),
        );
        let db = database_with(vec![other]);

        assert!(locate_config(&db).is_none());
    }

    #[test]
    fn duplicate_config_entries_yield_none() {
        let db = database_with(vec![config_entry(&["work"]), config_entry(&["home"])]);
        assert!(locate_config(&db).is_none());
    }

    #[test]
    fn config_entry_without_tags_yields_none() {
        let db = database_with(vec![config_entry(&[])]);
        assert!(locate_config(&db).is_none());
    }

    #[test]
    fn title_match_is_exact() {
        let mut entry = config_entry(&["work"]);
        entry.fields.insert(
            "Title".to_string(),
            Value::Unprotected(format!("{CONFIG_ENTRY_TITLE} (old)")),
        );
        let db = database_with(vec![entry]);

        assert!(locate_config(&db).is_none());
    }

    #[test]
    fn clear_totp_is_triggered_by_field_presence() {
        let mut entry = config_entry(&["work"]);
        entry
            .fields
            .insert(CLEAR_TOTP_FIELD.to_string(), Value::Unprotected(String::new()));
        let db = database_with(vec![entry]);

        assert!(locate_config(&db).unwrap().clear_totp);
    }

    #[test]
    fn empty_url_yields_no_path_hint() {
        let mut entry = config_entry(&["work"]);
        entry
            .fields
            .insert("URL".to_string(), Value::Unprotected(String::new()));
        let db = database_with(vec![entry]);

        assert!(locate_config(&db).unwrap().path_hint.is_none());
    }
}
