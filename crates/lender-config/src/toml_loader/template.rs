//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Lender assistant configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[service]
# base_url = "http://localhost:8000"   # overridden by LENDER_BASE_URL
# connect_timeout_secs = 10            # 1-60
# request_timeout_secs = 120           # 1-600

[summary]
# settle_delay_ms = 400                # 0-5000, quiet period after a reply
# auto_generate = true

[session]
# event_capacity = 64                  # 8-4096

[logging]
# level = "info"                       # trace, debug, info, warn, error
"##
}
