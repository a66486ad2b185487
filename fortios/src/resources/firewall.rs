//! Firewall objects

use super::{ResourceSpec, ENABLE_DISABLE};
use fortiplug::Field;

const MAC_RANGE: &str =
    r"^[0-9a-fA-F]{2}(:[0-9a-fA-F]{2}){5}(-[0-9a-fA-F]{2}(:[0-9a-fA-F]{2}){5})?$";

pub static FIREWALL_ADDRESS: ResourceSpec = ResourceSpec::new(
    "fortios_firewall_address",
    "FirewallAddress",
    "firewall/address",
    Some("name"),
    "Configure IPv4 addresses.",
    firewall_address_fields,
);

fn firewall_address_fields() -> Vec<Field> {
    vec![
        Field::string("name")
            .required()
            .max_length(79)
            .description("Address name.")
            .build(),
        Field::string("uuid").computed().build(),
        Field::string("subnet")
            .optional()
            .computed()
            .cidr()
            .description("IP address and subnet mask of address.")
            .build(),
        Field::string("type")
            .optional()
            .computed()
            .one_of(&[
                "ipmask",
                "iprange",
                "fqdn",
                "geography",
                "wildcard",
                "dynamic",
                "interface-subnet",
                "mac",
            ])
            .description("Type of address.")
            .build(),
        Field::string("sub_type")
            .optional()
            .computed()
            .one_of(&["sdn", "clearpass-spt", "fsso", "ems-tag", "swc-tag"])
            .since(6, 4, 0)
            .build(),
        Field::string("start_ip").optional().computed().build(),
        Field::string("end_ip").optional().computed().build(),
        Field::string("fqdn").optional().max_length(255).build(),
        Field::string("country").optional().max_length(2).build(),
        Field::string("wildcard").optional().computed().build(),
        Field::integer("cache_ttl")
            .optional()
            .computed()
            .int_between(0, 86400)
            .build(),
        Field::string("associated_interface")
            .optional()
            .max_length(35)
            .build(),
        Field::integer("color")
            .optional()
            .computed()
            .int_between(0, 32)
            .build(),
        Field::string("comment").optional().max_length(255).build(),
        Field::string("visibility")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("allow_routing")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("fabric_object")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .since(6, 4, 0)
            .build(),
        Field::block(
            "macaddr",
            vec![Field::string("macaddr")
                .optional()
                .max_length(127)
                .pattern(MAC_RANGE, "MAC address or range <start>[-<end>]")
                .build()],
        )
        .optional()
        .sort_by("macaddr")
        .description("MAC address ranges <start>[-<end>] separated by space.")
        .build(),
        Field::block(
            "tagging",
            vec![
                Field::string("name").optional().max_length(63).build(),
                Field::string("category").optional().max_length(63).build(),
                Field::block(
                    "tags",
                    vec![Field::string("name").optional().max_length(79).build()],
                )
                .optional()
                .sort_by("name")
                .build(),
            ],
        )
        .optional()
        .sort_by("name")
        .build(),
    ]
}
