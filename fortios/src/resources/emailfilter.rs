//! Email filtering

use super::{ResourceSpec, ENABLE_DISABLE};
use fortiplug::Field;

/// Banned word lists. The device key is `id`, which clashes with the
/// resource identifier, so it is exposed locally as `fosid`.
pub static EMAILFILTER_BWORD: ResourceSpec = ResourceSpec::new(
    "fortios_emailfilter_bword",
    "EmailfilterBword",
    "emailfilter/bword",
    Some("fosid"),
    "Configure AntiSpam banned word list.",
    emailfilter_bword_fields,
);

fn emailfilter_bword_fields() -> Vec<Field> {
    vec![
        Field::integer("fosid")
            .wire("id")
            .required()
            .force_new()
            .int_between(0, 4294967295)
            .description("ID.")
            .build(),
        Field::string("name")
            .required()
            .max_length(63)
            .description("Name of table.")
            .build(),
        Field::string("comment").optional().max_length(255).build(),
        Field::block(
            "entries",
            vec![
                Field::string("status")
                    .optional()
                    .computed()
                    .one_of(ENABLE_DISABLE)
                    .build(),
                Field::integer("id")
                    .optional()
                    .computed()
                    .int_between(0, 4294967295)
                    .build(),
                Field::string("pattern").optional().max_length(127).build(),
                Field::string("pattern_type")
                    .optional()
                    .computed()
                    .one_of(&["wildcard", "regexp"])
                    .build(),
                Field::string("action")
                    .optional()
                    .computed()
                    .one_of(&["spam", "clear"])
                    .build(),
                Field::string("where")
                    .optional()
                    .computed()
                    .one_of(&["subject", "body", "all"])
                    .build(),
                Field::string("language")
                    .optional()
                    .computed()
                    .one_of(&[
                        "western", "simch", "trach", "japanese", "korean", "french", "thai",
                        "spanish",
                    ])
                    .build(),
                Field::integer("score")
                    .optional()
                    .computed()
                    .int_between(1, 99999)
                    .build(),
            ],
        )
        .optional()
        .sort_by("id")
        .description("Spam filter banned word.")
        .build(),
    ]
}
