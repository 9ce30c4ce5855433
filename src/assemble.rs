//! Destination database assembly.

use keepass::db::Node;
use keepass::Database;

use crate::filter::FilterOutcome;

/// Build the destination database from the source's settings and the filter
/// outcome.
///
/// The database config (cipher, compression, KDF) is taken over verbatim, as
/// are the store-level meta scalars. Clones become direct children of the
/// destination root, in traversal order. The result carries no key; the
/// writer derives one from the configured password when persisting.
pub fn assemble_export(source: &Database, outcome: FilterOutcome) -> Database {
    let mut export = Database::new(source.config.clone());

    export.meta.color = source.meta.color.clone();
    export.meta.default_username = source.meta.default_username.clone();
    export.meta.database_description = source.meta.database_description.clone();
    export.meta.history_max_items = source.meta.history_max_items.clone();
    export.meta.history_max_size = source.meta.history_max_size.clone();
    export.meta.maintenance_history_days = source.meta.maintenance_history_days.clone();
    export.meta.master_key_change_force = source.meta.master_key_change_force.clone();
    export.meta.master_key_change_rec = source.meta.master_key_change_rec.clone();
    export.meta.database_name = source.meta.database_name.clone();
    export.meta.recyclebin_enabled = source.meta.recyclebin_enabled.clone();

    export.root.name = source.root.name.clone();

    for uuid in &outcome.icons {
        let found = source
            .meta
            .custom_icons
            .icons
            .iter()
            .find(|icon| icon.uuid == *uuid);
        match found {
            Some(icon) => export.meta.custom_icons.icons.push(icon.clone()),
            // Referenced but missing in the source; nothing to carry over.
            None => tracing::warn!(icon = %uuid, "icon referenced by an entry is missing from the source"),
        }
    }

    for entry in outcome.entries {
        export.root.children.push(Node::Entry(entry));
    }

    export
}
