use crate::core::datetime::LinuxDateFormat;
use std::collections::BTreeMap;
use std::fmt;

use super::aix::AixPolicy;
use super::hpux::HpuxPolicy;
use super::linux::LinuxPolicy;
use super::sunos::SunOsPolicy;
use super::OsPolicy;

/// User preferences handed to family policies when they are built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub linux_date_format: LinuxDateFormat,
}

pub type PolicyFactory = fn(&ParserOptions) -> Box<dyn OsPolicy>;

/// Maps the leading token of a report to the policy that understands it
#[derive(Clone, Default)]
pub struct FamilyRegistry {
    factories: BTreeMap<String, PolicyFactory>,
}

impl fmt::Debug for FamilyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl FamilyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with AIX, HP-UX, Linux and SunOS
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("AIX", |_| Box::new(AixPolicy));
        registry.register("HPUX", |_| Box::new(HpuxPolicy));
        registry.register("Linux", |options| {
            Box::new(LinuxPolicy::new(options.linux_date_format))
        });
        registry.register("SunOS", |_| Box::new(SunOsPolicy));
        registry
    }

    pub fn register(&mut self, family: &str, factory: PolicyFactory) {
        self.factories.insert(normalize(family), factory);
    }

    /// Factory for a report whose first token is `token` (`HP-UX` matches `HPUX`)
    pub fn lookup(&self, token: &str) -> Option<PolicyFactory> {
        self.factories.get(&normalize(token)).copied()
    }

    pub fn family_names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

fn normalize(token: &str) -> String {
    token.replace('-', "")
}
