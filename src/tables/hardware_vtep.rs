//! Typed tables of the `hardware_vtep` database

use std::collections::{BTreeMap, BTreeSet};

use crate::notation::Version;
use crate::schema::ValueKind;
use crate::typed::{column_accessors, typed_table, ColumnDescriptor, TableDescriptor};

pub const DATABASE: &str = "hardware_vtep";

const V1_0_0: Version = Version::new(1, 0, 0);

pub static MANAGER: TableDescriptor = TableDescriptor {
    table: "Manager",
    database: DATABASE,
    from_version: V1_0_0,
    columns: &[
        ColumnDescriptor::new("target", "target", ValueKind::Atom).since(V1_0_0).required(),
        ColumnDescriptor::new("max_backoff", "max_backoff", ValueKind::Set).since(V1_0_0),
        ColumnDescriptor::new("inactivity_probe", "inactivity_probe", ValueKind::Set).since(V1_0_0),
        ColumnDescriptor::new("other_config", "other_config", ValueKind::Map).since(V1_0_0),
        ColumnDescriptor::new("is_connected", "is_connected", ValueKind::Atom).since(V1_0_0),
        ColumnDescriptor::new("status", "status", ValueKind::Map).since(V1_0_0),
    ],
};

typed_table!(
    /// OVSDB management connection of a hardware VTEP
    Manager,
    MANAGER
);

impl Manager {
    column_accessors!("target": String => target_column, target, set_target);
    column_accessors!("max_backoff": BTreeSet<i64> => max_backoff_column, max_backoff, set_max_backoff);
    column_accessors!("inactivity_probe": BTreeSet<i64> => inactivity_probe_column, inactivity_probe, set_inactivity_probe);
    column_accessors!("other_config": BTreeMap<String, String> => other_config_column, other_config, set_other_config);
    column_accessors!("is_connected": bool => is_connected_column, is_connected, set_is_connected);
    column_accessors!("status": BTreeMap<String, String> => status_column, status, set_status);
}
