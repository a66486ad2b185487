//! Log settings

use super::{ResourceSpec, ENABLE_DISABLE};
use fortiplug::Field;

pub static LOG_FORTIANALYZER_OVERRIDE_SETTING: ResourceSpec = ResourceSpec::new(
    "fortios_log_fortianalyzer_override_setting",
    "LogFortianalyzerOverrideSetting",
    "log.fortianalyzer/override-setting",
    None,
    "Override FortiAnalyzer settings.",
    log_fortianalyzer_override_setting_fields,
);

fn toggle(name: &str) -> Field {
    Field::string(name)
        .optional()
        .computed()
        .one_of(ENABLE_DISABLE)
        .build()
}

fn log_fortianalyzer_override_setting_fields() -> Vec<Field> {
    vec![
        Field::string("use_management_vdom")
            .optional()
            .computed()
            .one_of(ENABLE_DISABLE)
            .since(6, 4, 0)
            .build(),
        toggle("override"),
        toggle("status"),
        toggle("ips_archive"),
        Field::string("server")
            .optional()
            .computed()
            .max_length(127)
            .description("The remote FortiAnalyzer.")
            .build(),
        toggle("certificate_verification"),
        Field::block(
            "serial",
            vec![Field::string("name").optional().max_length(25).build()],
        )
        .optional()
        .sort_by("name")
        .description("Serial numbers of the FortiAnalyzer.")
        .build(),
        Field::string("preshared_key")
            .optional()
            .sensitive()
            .max_length(63)
            .build(),
        toggle("access_config"),
        Field::string("hmac_algorithm")
            .optional()
            .computed()
            .one_of(&["sha256", "sha1"])
            .build(),
        Field::string("enc_algorithm")
            .optional()
            .computed()
            .one_of(&["high-medium", "high", "low"])
            .build(),
        Field::string("ssl_min_proto_version")
            .optional()
            .computed()
            .one_of(&["default", "SSLv3", "TLSv1", "TLSv1-1", "TLSv1-2"])
            .build(),
        Field::integer("conn_timeout")
            .optional()
            .computed()
            .int_between(1, 3600)
            .build(),
        Field::integer("monitor_keepalive_period")
            .optional()
            .computed()
            .int_between(1, 120)
            .build(),
        Field::integer("monitor_failure_retry_period")
            .optional()
            .computed()
            .int_between(1, 86400)
            .build(),
        Field::string("certificate").optional().computed().max_length(35).build(),
        Field::string("source_ip").optional().computed().max_length(63).build(),
        Field::string("upload_option")
            .optional()
            .computed()
            .one_of(&["store-and-upload", "realtime", "1-minute", "5-minute"])
            .build(),
        Field::string("upload_interval")
            .optional()
            .computed()
            .one_of(&["daily", "weekly", "monthly"])
            .build(),
        Field::string("upload_day").optional().computed().build(),
        Field::string("upload_time").optional().computed().build(),
        toggle("reliable"),
        Field::string("priority")
            .optional()
            .computed()
            .one_of(&["default", "low"])
            .build(),
        Field::integer("max_log_rate")
            .optional()
            .computed()
            .int_between(0, 100000)
            .build(),
        Field::string("interface_select_method")
            .optional()
            .computed()
            .one_of(&["auto", "sdwan", "specify"])
            .build(),
        Field::string("interface").optional().computed().max_length(15).build(),
    ]
}
