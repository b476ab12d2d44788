//! # notifyconf-ports
//!
//! Port traits for the notifyconf hexagonal architecture.
//!
//! This crate defines the interfaces between the resolution engine and its
//! collaborators: document readers, plugins, logging and time. It depends
//! only on `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod clock;
pub mod logger;
pub mod plugin;
pub mod reader;

pub use clock::*;
pub use logger::*;
pub use plugin::*;
pub use reader::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `notifyconf-domain`.
pub use notifyconf_domain::{
    ArgMap, AssetOptions, ConfigFormat, IncludeMode, ParsedUrl, PluginDescriptor, TagSet,
};

#[cfg(test)]
mod tests {
    use super::*;
    use notifyconf_domain::domain_crate_version;
    use notifyconf_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]" || line == "[dev-dependencies]";
                continue;
            }
            if in_deps && line.starts_with("notifyconf-") {
                let key = line.split('=').next().unwrap_or("").trim();
                deps.push(key.split('.').next().unwrap_or("").trim().to_string());
            }
        }

        deps
    }

    #[test]
    fn ports_depends_only_on_domain_and_shared() {
        let deps = workspace_deps();
        let allowed = ["notifyconf-domain", "notifyconf-shared"];

        for dep in &deps {
            assert!(
                allowed.contains(&dep.as_str()),
                "unexpected dependency found: {dep}"
            );
        }
        for expected in allowed {
            assert!(
                deps.iter().any(|dep| dep == expected),
                "missing dependency: {expected}"
            );
        }
    }

    #[test]
    fn ports_can_use_domain_and_shared() {
        assert!(!ports_crate_version().is_empty());
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }

    #[derive(Debug)]
    struct Silent {
        tags: TagSet,
        asset: AssetOptions,
    }

    impl Destination for Silent {
        fn schema(&self) -> &str {
            "silent"
        }

        fn service_name(&self) -> &str {
            "Silent"
        }

        fn tags(&self) -> &TagSet {
            &self.tags
        }

        fn asset(&self) -> &AssetOptions {
            &self.asset
        }

        fn url(&self, _privacy: bool) -> String {
            "silent://".to_owned()
        }
    }

    #[test]
    fn default_notify_reports_unsupported_delivery() {
        let destination = Silent {
            tags: TagSet::new(),
            asset: AssetOptions::default(),
        };
        let outcome = destination.notify(&Message::new("hello"));
        assert!(matches!(
            outcome,
            Err(ref error) if error.code.is("plugin", "delivery_unsupported")
        ));
    }
}
