use tracing::{info, warn};

/// Locale used when the configured one has no translations
pub const FALLBACK_LOCALE: &str = "en";

/// Switch the message language, falling back to English for unknown locales
pub fn set_locale(locale: &str) -> &str {
    let available = rust_i18n::available_locales!();

    if available.iter().any(|l| *l == locale) {
        rust_i18n::set_locale(locale);
        info!("Setting locale to {}", locale);
        locale
    } else {
        warn!(
            "Unknown locale {} (available: {}), using {}",
            locale,
            available.join(", "),
            FALLBACK_LOCALE
        );
        rust_i18n::set_locale(FALLBACK_LOCALE);
        FALLBACK_LOCALE
    }
}
