//! System settings

use super::{ResourceSpec, ENABLE_DISABLE};
use fortiplug::Field;

pub static SYSTEM_SNMP_USER: ResourceSpec = ResourceSpec::new(
    "fortios_system_snmp_user",
    "SystemSnmpUser",
    "system.snmp/user",
    Some("name"),
    "SNMP user configuration.",
    system_snmp_user_fields,
);

pub static SYSTEM_VXLAN: ResourceSpec = ResourceSpec::new(
    "fortios_system_vxlan",
    "SystemVxlan",
    "system/vxlan",
    Some("name"),
    "Configure VXLAN devices.",
    system_vxlan_fields,
);

fn system_snmp_user_fields() -> Vec<Field> {
    vec![
        Field::string("name")
            .required()
            .max_length(32)
            .description("SNMP user name.")
            .build(),
        Field::string("status")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("trap_status")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::integer("trap_lport")
            .optional()
            .computed()
            .int_between(1, 65535)
            .build(),
        Field::integer("trap_rport")
            .optional()
            .computed()
            .int_between(1, 65535)
            .build(),
        Field::string("queries")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::integer("query_port")
            .optional()
            .computed()
            .int_between(1, 65535)
            .build(),
        Field::string("notify_hosts").optional().computed().build(),
        Field::string("notify_hosts6").optional().computed().build(),
        Field::string("source_ip").optional().computed().build(),
        Field::string("source_ipv6").optional().computed().build(),
        Field::string("ha_direct")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("events")
            .optional()
            .computed()
            .description("SNMP notifications (traps) to send.")
            .build(),
        Field::string("mib_view").optional().max_length(32).since(7, 0, 0).build(),
        Field::block(
            "vdoms",
            vec![Field::string("name").optional().max_length(79).build()],
        )
        .optional()
        .sort_by("name")
        .since(7, 0, 0)
        .build(),
        Field::string("security_level")
            .optional()
            .computed()
            .one_of(&["no-auth-no-priv", "auth-no-priv", "auth-priv"])
            .build(),
        Field::string("auth_proto")
            .optional()
            .computed()
            .one_of(&["md5", "sha", "sha224", "sha256", "sha384", "sha512"])
            .build(),
        Field::string("auth_pwd")
            .optional()
            .sensitive()
            .max_length(128)
            .description("Password for authentication protocol.")
            .build(),
        Field::string("priv_proto")
            .optional()
            .computed()
            .one_of(&["aes", "des", "aes256", "aes256cisco"])
            .build(),
        Field::string("priv_pwd")
            .optional()
            .sensitive()
            .max_length(128)
            .description("Password for privacy (encryption) protocol.")
            .build(),
    ]
}

fn system_vxlan_fields() -> Vec<Field> {
    vec![
        Field::string("name")
            .required()
            .force_new()
            .max_length(15)
            .description("VXLAN device or interface name.")
            .build(),
        Field::string("interface")
            .required()
            .max_length(15)
            .description("Outgoing interface for VXLAN encapsulated traffic.")
            .build(),
        Field::integer("vni")
            .required()
            .int_between(1, 16777215)
            .description("VXLAN network ID.")
            .build(),
        Field::string("ip_version")
            .required()
            .one_of(&[
                "ipv4-unicast",
                "ipv6-unicast",
                "ipv4-multicast",
                "ipv6-multicast",
            ])
            .build(),
        Field::block(
            "remote_ip",
            vec![Field::string("ip").optional().max_length(15).build()],
        )
        .optional()
        .sort_by("ip")
        .build(),
        Field::block(
            "remote_ip6",
            vec![Field::string("ip6").optional().max_length(45).build()],
        )
        .optional()
        .sort_by("ip6")
        .build(),
        Field::integer("dstport")
            .optional()
            .computed()
            .int_between(1, 65535)
            .build(),
        Field::integer("multicast_ttl")
            .optional()
            .computed()
            .int_between(1, 255)
            .build(),
        Field::integer("evpn_id").optional().computed().since(7, 0, 0).build(),
        Field::string("learn_from_traffic")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .since(7, 0, 0)
            .build(),
    ]
}
