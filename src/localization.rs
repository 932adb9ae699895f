//! # Localization Module
//!
//! User-facing strings live in a Fluent resource compiled into the binary.
//! The bot speaks Ukrainian only.

use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::sync::LazyLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

const UK_RESOURCE: &str = include_str!("../locales/uk/main.ftl");

/// Localization manager for the task bot
pub struct LocalizationManager {
    bundle: FluentBundle<FluentResource>,
}

impl LocalizationManager {
    pub fn new() -> Result<Self> {
        let locale: LanguageIdentifier = "uk".parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the Unicode isolation marks literally.
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(UK_RESOURCE.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid Fluent resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate Fluent messages: {errors:?}"))?;

        Ok(Self { bundle })
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let Some(msg) = self.bundle.get_message(key) else {
            return format!("Missing translation: {key}");
        };
        let Some(pattern) = msg.value() else {
            return format!("Missing value for key: {key}");
        };

        let mut errors = vec![];
        let value = self.bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            warn!(key = %key, errors = ?errors, "Fluent formatting reported errors");
        }
        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }
        self.get_message(key, Some(&fluent_args))
    }
}

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> = LazyLock::new(|| {
    // The resource is compiled in, so a failure here is a build-time mistake.
    LocalizationManager::new().unwrap_or_else(|e| panic!("Bundled locale is invalid: {e}"))
});

/// Convenience function to get a localized message
pub fn t(key: &str) -> String {
    LOCALIZATION_MANAGER.get_message(key, None)
}

/// Convenience function to get a localized message with arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    LOCALIZATION_MANAGER.get_message_with_args(key, args)
}
