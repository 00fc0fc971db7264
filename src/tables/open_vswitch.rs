//! Typed tables of the `Open_vSwitch` database

use std::collections::{BTreeMap, BTreeSet};

use crate::notation::{RowUuid, Version};
use crate::schema::ValueKind;
use crate::typed::{column_accessors, typed_table, ColumnDescriptor, TableDescriptor};

pub const DATABASE: &str = "Open_vSwitch";

pub static OPEN_VSWITCH: TableDescriptor = TableDescriptor {
    table: "Open_vSwitch",
    database: DATABASE,
    from_version: Version::NULL,
    columns: &[
        ColumnDescriptor::new("bridges", "bridges", ValueKind::Set).required(),
        ColumnDescriptor::new("ovs_version", "ovs_version", ValueKind::Set),
        ColumnDescriptor::new("other_config", "other_config", ValueKind::Map),
        ColumnDescriptor::new("external_ids", "external_ids", ValueKind::Map),
        ColumnDescriptor::new("manager_options", "manager_options", ValueKind::Set)
            .since(Version::new(1, 0, 0)),
    ],
};

pub static BRIDGE: TableDescriptor = TableDescriptor {
    table: "Bridge",
    database: DATABASE,
    from_version: Version::NULL,
    columns: &[
        ColumnDescriptor::new("name", "name", ValueKind::Atom).required(),
        ColumnDescriptor::new("ports", "ports", ValueKind::Set),
        ColumnDescriptor::new("controller", "controller", ValueKind::Set),
        ColumnDescriptor::new("protocols", "protocols", ValueKind::Set).since(Version::new(6, 11, 1)),
        ColumnDescriptor::new("datapath_id", "datapath_id", ValueKind::Set),
        ColumnDescriptor::new("datapath_type", "datapath_type", ValueKind::Atom),
        ColumnDescriptor::new("fail_mode", "fail_mode", ValueKind::Set),
        ColumnDescriptor::new("other_config", "other_config", ValueKind::Map),
        ColumnDescriptor::new("external_ids", "external_ids", ValueKind::Map),
    ],
};

pub static PORT: TableDescriptor = TableDescriptor {
    table: "Port",
    database: DATABASE,
    from_version: Version::NULL,
    columns: &[
        ColumnDescriptor::new("name", "name", ValueKind::Atom).required(),
        ColumnDescriptor::new("interfaces", "interfaces", ValueKind::Set),
        ColumnDescriptor::new("tag", "tag", ValueKind::Set),
        ColumnDescriptor::new("trunks", "trunks", ValueKind::Set),
    ],
};

pub static INTERFACE: TableDescriptor = TableDescriptor {
    table: "Interface",
    database: DATABASE,
    from_version: Version::NULL,
    columns: &[
        ColumnDescriptor::new("name", "name", ValueKind::Atom).required(),
        ColumnDescriptor::new("type", "type", ValueKind::Atom),
        ColumnDescriptor::new("ofport", "ofport", ValueKind::Set),
        ColumnDescriptor::new("options", "options", ValueKind::Map),
    ],
};

pub static CONTROLLER: TableDescriptor = TableDescriptor {
    table: "Controller",
    database: DATABASE,
    from_version: Version::NULL,
    columns: &[
        ColumnDescriptor::new("target", "target", ValueKind::Atom).required(),
        ColumnDescriptor::new("is_connected", "is_connected", ValueKind::Atom)
            .since(Version::new(1, 1, 0)),
    ],
};

typed_table!(
    /// Root table; one row per switch
    OpenVSwitch,
    OPEN_VSWITCH
);

impl OpenVSwitch {
    column_accessors!("bridges": BTreeSet<RowUuid> => bridges_column, bridges, set_bridges);
    column_accessors!("ovs_version": BTreeSet<String> => ovs_version_column, ovs_version, set_ovs_version);
    column_accessors!("other_config": BTreeMap<String, String> => other_config_column, other_config, set_other_config);
    column_accessors!("external_ids": BTreeMap<String, String> => external_ids_column, external_ids, set_external_ids);
    column_accessors!("manager_options": BTreeSet<RowUuid> => manager_options_column, manager_options, set_manager_options);
}

typed_table!(Bridge, BRIDGE);

impl Bridge {
    column_accessors!("name": String => name_column, name, set_name);
    column_accessors!("ports": BTreeSet<RowUuid> => ports_column, ports, set_ports);
    column_accessors!("controller": BTreeSet<RowUuid> => controller_column, controller, set_controller);
    column_accessors!("protocols": BTreeSet<String> => protocols_column, protocols, set_protocols);
    column_accessors!("datapath_id": BTreeSet<String> => datapath_id_column, datapath_id, set_datapath_id);
    column_accessors!("datapath_type": String => datapath_type_column, datapath_type, set_datapath_type);
    column_accessors!("fail_mode": BTreeSet<String> => fail_mode_column, fail_mode, set_fail_mode);
    column_accessors!("other_config": BTreeMap<String, String> => other_config_column, other_config, set_other_config);
    column_accessors!("external_ids": BTreeMap<String, String> => external_ids_column, external_ids, set_external_ids);
}

typed_table!(Port, PORT);

impl Port {
    column_accessors!("name": String => name_column, name, set_name);
    column_accessors!("interfaces": BTreeSet<RowUuid> => interfaces_column, interfaces, set_interfaces);
    column_accessors!("tag": BTreeSet<i64> => tag_column, tag, set_tag);
    column_accessors!("trunks": BTreeSet<i64> => trunks_column, trunks, set_trunks);
}

typed_table!(Interface, INTERFACE);

impl Interface {
    column_accessors!("name": String => name_column, name, set_name);
    column_accessors!("type": String => type_column, interface_type, set_interface_type);
    column_accessors!("ofport": BTreeSet<i64> => ofport_column, ofport, set_ofport);
    column_accessors!("options": BTreeMap<String, String> => options_column, options, set_options);
}

typed_table!(Controller, CONTROLLER);

impl Controller {
    column_accessors!("target": String => target_column, target, set_target);
    column_accessors!("is_connected": bool => is_connected_column, is_connected, set_is_connected);
}
