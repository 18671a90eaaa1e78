// env_config.rs — Environment-variable knobs.
//
// Every tuning read goes through these helpers so the truthy/falsey
// parsing lives in one place.
//
// Recognized variables:
//   RGBCONV_FORCE_SCALAR : truthy forces the scalar lane width.
//   RGBCONV_LANES        : 1, 4 or 8; overrides lane detection.

pub(crate) const FORCE_SCALAR_VAR: &str = "RGBCONV_FORCE_SCALAR";
pub(crate) const LANES_VAR: &str = "RGBCONV_LANES";

/// Returns `true` when the variable is set to `1`, `true`, `yes` or `on`
/// (case-insensitive, trimmed).
#[inline]
pub(crate) fn env_var_truthy(var_name: &str) -> bool {
    std::env::var(var_name)
        .map(|raw| is_truthy(&raw))
        .unwrap_or(false)
}

/// Parses the variable as a `u64`, returning `Some` only for a positive
/// integer.
#[inline]
pub(crate) fn env_var_positive_u64(var_name: &str) -> Option<u64> {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| parse_positive(&raw))
}

fn is_truthy(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|value| *value > 0)
}

/// Declares a cached boolean flag backed by a `OnceLock<bool>`.
///
/// `enabled_when(fn_name, "ENV_VAR")`: `true` only when the variable is
/// truthy. The value is read once per process.
macro_rules! define_env_flag {
    (enabled_when($fn_name:ident, $var:expr)) => {
        #[inline]
        fn $fn_name() -> bool {
            static VALUE: ::std::sync::OnceLock<bool> = ::std::sync::OnceLock::new();
            *VALUE.get_or_init(|| $crate::env_config::env_var_truthy($var))
        }
    };
}

pub(crate) use define_env_flag;
