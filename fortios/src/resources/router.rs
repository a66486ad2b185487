//! Routing

use super::{ResourceSpec, ENABLE_DISABLE};
use fortiplug::Field;

/// Static routes are keyed by a sequence number the device assigns when
/// none is configured.
pub static ROUTER_STATIC: ResourceSpec = ResourceSpec::new(
    "fortios_router_static",
    "RouterStatic",
    "router/static",
    Some("seq_num"),
    "Configure IPv4 static routing tables.",
    router_static_fields,
);

fn router_static_fields() -> Vec<Field> {
    vec![
        Field::integer("seq_num")
            .optional()
            .computed()
            .int_between(0, 4294967295)
            .description("Sequence number.")
            .build(),
        Field::string("status")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("dst")
            .optional()
            .computed()
            .cidr()
            .description("Destination IP and mask for this route.")
            .build(),
        Field::string("src").optional().computed().cidr().build(),
        Field::string("gateway")
            .optional()
            .computed()
            .description("Gateway IP for this route.")
            .build(),
        Field::integer("distance")
            .optional()
            .computed()
            .int_between(1, 255)
            .build(),
        Field::integer("weight")
            .optional()
            .computed()
            .int_between(0, 255)
            .build(),
        Field::integer("priority")
            .optional()
            .computed()
            .int_between(0, 4294967295)
            .build(),
        Field::string("device").optional().computed().max_length(35).build(),
        Field::string("comment").optional().max_length(255).build(),
        Field::string("blackhole")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("dynamic_gateway")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::string("dstaddr").optional().max_length(79).build(),
        Field::integer("internet_service").optional().computed().build(),
        Field::string("internet_service_custom")
            .optional()
            .max_length(64)
            .build(),
        Field::string("link_monitor_exempt")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::integer("vrf")
            .optional()
            .computed()
            .int_between(0, 31)
            .since(7, 0, 0)
            .build(),
        Field::string("bfd")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .build(),
        Field::block(
            "sdwan_zone",
            vec![Field::string("name").optional().max_length(79).build()],
        )
        .optional()
        .sort_by("name")
        .since(7, 0, 0)
        .build(),
    ]
}
