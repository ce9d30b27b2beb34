//! Qualified-name candidates for identifiers and type names.
//!
//! A short name written inside a package may refer to a declaration in that
//! package, in any enclosing package, or at the root. The packager lists the
//! fully-qualified spellings to try, most specific first.

/// Produces the ordered candidate spellings of a name.
pub trait Packager: Send + Sync {
    fn resolve_candidate_names(&self, name: &str) -> Vec<String>;
}

/// Root packager: the only candidate is the name itself.
///
/// A leading `.` marks a name as already fully qualified and is stripped.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultPackager;

impl Packager for DefaultPackager {
    fn resolve_candidate_names(&self, name: &str) -> Vec<String> {
        vec![name.strip_prefix('.').unwrap_or(name).to_string()]
    }
}

/// Packager for expressions declared inside a dotted package, e.g. `acme.billing`.
///
/// `invoice` resolves to `acme.billing.invoice`, then `acme.invoice`, then
/// `invoice`. Names with a leading `.` skip the package.
#[derive(Clone, Debug)]
pub struct Package {
    name: String,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Package { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Packager for Package {
    fn resolve_candidate_names(&self, name: &str) -> Vec<String> {
        if let Some(absolute) = name.strip_prefix('.') {
            return vec![absolute.to_string()];
        }
        if self.name.is_empty() {
            return vec![name.to_string()];
        }

        let mut candidates = Vec::new();
        let mut prefix = self.name.as_str();
        loop {
            candidates.push(format!("{prefix}.{name}"));
            match prefix.rfind('.') {
                Some(dot) => prefix = &prefix[..dot],
                None => break,
            }
        }
        candidates.push(name.to_string());
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_packager() {
        assert_eq!(DefaultPackager.resolve_candidate_names("a.b"), vec!["a.b"]);
        assert_eq!(DefaultPackager.resolve_candidate_names(".a.b"), vec!["a.b"]);
    }

    #[test]
    fn test_package_candidates_innermost_first() {
        let package = Package::new("acme.billing");
        assert_eq!(
            package.resolve_candidate_names("invoice.Status"),
            vec![
                "acme.billing.invoice.Status",
                "acme.invoice.Status",
                "invoice.Status",
            ]
        );
        assert_eq!(package.name(), "acme.billing");
    }

    #[test]
    fn test_package_absolute_name() {
        let package = Package::new("acme");
        assert_eq!(package.resolve_candidate_names(".x"), vec!["x"]);
        assert_eq!(Package::new("").resolve_candidate_names("x"), vec!["x"]);
    }
}
