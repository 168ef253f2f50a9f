//! Database server flavors: vendor, version and variant.
//!
//! Every piece of DDL rendering and every introspection fixup asks a
//! [`Flavor`] whether some capability is present instead of comparing
//! version numbers inline.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// ================================================================
// Version
// ================================================================

/// A (major, minor, patch) version number tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Version(pub [u16; 3]);

/// Latest MySQL major.minor release known to this crate.
pub const LATEST_MYSQL_VERSION: Version = Version([9, 1, 0]);
/// Latest MariaDB major.minor release known to this crate.
pub const LATEST_MARIADB_VERSION: Version = Version([11, 5, 0]);
/// Oldest MySQL major.minor release supported by this crate.
pub const OLDEST_SUPPORTED_MYSQL_VERSION: Version = Version([5, 5, 0]);
/// Oldest MariaDB major.minor release supported by this crate.
pub const OLDEST_SUPPORTED_MARIADB_VERSION: Version = Version([10, 1, 0]);

/// Error returned when a version string contains a part that is not a
/// number. The best-effort version, with that part zeroed, is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version part {part:?} in {input:?}")]
pub struct ParseVersionError {
    /// The whole input string.
    pub input: String,
    /// The offending dot-separated part.
    pub part: String,
    /// The version obtained by treating unparseable parts as zero.
    pub partial: Version,
}

impl Version {
    /// Creates a version from its three components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self([major, minor, patch])
    }

    /// Major component.
    #[must_use]
    pub const fn major(self) -> u16 {
        self.0[0]
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(self) -> u16 {
        self.0[1]
    }

    /// Patch component, also known as the point release.
    #[must_use]
    pub const fn patch(self) -> u16 {
        self.0[2]
    }

    const fn pack(self) -> u64 {
        ((self.0[0] as u64) << 32) + ((self.0[1] as u64) << 16) + self.0[2] as u64
    }

    const fn pack_major_minor(self) -> u64 {
        ((self.0[0] as u64) << 32) + ((self.0[1] as u64) << 16)
    }

    /// Returns true if this version is greater than or equal to `other`.
    #[must_use]
    pub const fn at_least(self, other: Self) -> bool {
        self.pack() >= other.pack()
    }

    /// Returns true if this version is strictly less than `other`.
    #[must_use]
    pub const fn below(self, other: Self) -> bool {
        self.pack() < other.pack()
    }

    /// Like [`Version::at_least`], but missing trailing parts of `parts`
    /// count as zero and parts beyond the third are ignored.
    #[must_use]
    pub fn at_least_parts(self, parts: &[u16]) -> bool {
        let mut comp = [0u16; 3];
        for (slot, part) in comp.iter_mut().zip(parts) {
            *slot = *part;
        }
        self.at_least(Self(comp))
    }

    /// Returns true if every supplied part equals the corresponding
    /// component. Missing parts are not compared.
    #[must_use]
    pub fn matches_parts(self, parts: &[u16]) -> bool {
        self.0.iter().zip(parts).all(|(mine, theirs)| mine == theirs)
    }

    /// Parses a dot-separated version. Any non-digit prefix before the major
    /// version and anything after the first non-digit of the patch version
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ParseVersionError`] if one of the parts is not a valid
    /// number; the error still carries the best-effort version.
    pub fn parse(s: &str) -> Result<Self, ParseVersionError> {
        let mut ver = [0u16; 3];
        let mut bad_part = None;
        for (n, raw) in s.splitn(3, '.').enumerate() {
            let part = match n {
                0 => raw
                    .find(|c: char| c.is_ascii_digit())
                    .map_or(raw, |pos| &raw[pos..]),
                2 => raw
                    .find(|c: char| !c.is_ascii_digit())
                    .map_or(raw, |pos| &raw[..pos]),
                _ => raw,
            };
            match part.parse::<u16>() {
                Ok(value) => ver[n] = value,
                Err(_) => {
                    if bad_part.is_none() {
                        bad_part = Some(part.to_string());
                    }
                }
            }
        }
        match bad_part {
            None => Ok(Self(ver)),
            Some(part) => Err(ParseVersionError {
                input: s.to_string(),
                part,
                partial: Self(ver),
            }),
        }
    }

    /// Parses a version, zeroing any part that is not a valid number.
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| err.partial)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0[0], self.0[1], self.0[2])
    }
}

// ================================================================
// Vendor and Variant
// ================================================================

/// An upstream DBMS with its own codebase and versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vendor {
    /// Unrecognized vendor.
    #[default]
    Unknown,
    /// Oracle MySQL.
    MySql,
    /// MariaDB.
    MariaDb,
}

impl Vendor {
    /// Lowercase name, as used in flavor strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::Unknown => "unknown",
        }
    }

    /// Converts a lowercase name to a vendor. Anything unrecognized is
    /// [`Vendor::Unknown`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        [Self::MySql, Self::MariaDb]
            .into_iter()
            .find(|v| v.as_str() == s)
            .unwrap_or(Self::Unknown)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bit set of patch-set products layered on an upstream vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Variant(u32);

impl Variant {
    /// No variant (also used for unknown variants).
    pub const NONE: Self = Self(0);
    /// Percona Server.
    pub const PERCONA: Self = Self(1);
    /// Amazon Aurora.
    pub const AURORA: Self = Self(1 << 1);

    const NAMED: [(Self, &'static str); 2] = [(Self::PERCONA, "percona"), (Self::AURORA, "aurora")];

    /// Returns true if no flag is set.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true if all flags of `other` are set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses a dash-separated list of variant names, ignoring unknown
    /// names.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let parts: Vec<&str> = s.split('-').collect();
        Self::NAMED
            .iter()
            .filter(|(_, name)| parts.contains(name))
            .fold(Self::NONE, |acc, (v, _)| acc | *v)
    }
}

impl std::ops::BitOr for Variant {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(v, _)| self.contains(*v))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("-"))
    }
}

// ================================================================
// Flavor
// ================================================================

/// A database server release: vendor, version and variant flags.
///
/// The default value is the unknown flavor, which every rendering function
/// accepts and treats as "no flavor-specific adjustment".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Flavor {
    /// Upstream vendor.
    pub vendor: Vendor,
    /// Server version.
    pub version: Version,
    /// Variant flags.
    pub variants: Variant,
}

/// The zero-value flavor.
pub const FLAVOR_UNKNOWN: Flavor = Flavor {
    vendor: Vendor::Unknown,
    version: Version([0, 0, 0]),
    variants: Variant::NONE,
};

/// Splits `name:major.minor.patch-label` into its name, version and label.
/// Missing or malformed components come back as zero values.
#[must_use]
pub fn split_versioned_identifier(s: &str) -> (&str, Version, &str) {
    match s.split_once(':') {
        Some((name, full_version)) => {
            let (version_string, label) = full_version.split_once('-').unwrap_or((full_version, ""));
            (name, Version::parse_lenient(version_string), label)
        }
        None => (s, Version::default(), ""),
    }
}

impl Flavor {
    /// Creates a flavor without variants.
    #[must_use]
    pub const fn new(vendor: Vendor, major: u16, minor: u16, patch: u16) -> Self {
        Self {
            vendor,
            version: Version::new(major, minor, patch),
            variants: Variant::NONE,
        }
    }

    /// Returns a copy carrying the given variant flags.
    #[must_use]
    pub const fn with_variants(mut self, variants: Variant) -> Self {
        self.variants = variants;
        self
    }

    /// Parses `base:major.minor[.patch]`, where base is a vendor or variant
    /// name. Variants imply MySQL.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let (base, version, _) = split_versioned_identifier(s);
        let mut flavor = Self {
            vendor: Vendor::parse(base),
            version,
            variants: Variant::NONE,
        };
        if flavor.vendor == Vendor::Unknown {
            let variant = Variant::parse(base);
            if !variant.is_none() {
                flavor.vendor = Vendor::MySql;
                flavor.variants = variant;
            }
        }
        flavor
    }

    /// Identifies a flavor from the server's `@@version` and
    /// `@@version_comment` values. Percona is detected, Aurora is not.
    #[must_use]
    pub fn identify(version_string: &str, version_comment: &str) -> Self {
        let mut flavor = Self {
            version: Version::parse_lenient(version_string),
            ..Self::default()
        };
        let version_string = version_string.to_lowercase();
        let version_comment = version_comment.to_lowercase();
        if version_comment.contains("percona") || version_string.contains("percona") {
            flavor.vendor = Vendor::MySql;
            flavor.variants = Variant::PERCONA;
        } else if let Some(vendor) = [Vendor::MariaDb, Vendor::MySql].into_iter().find(|v| {
            version_comment.contains(v.as_str()) || version_string.contains(v.as_str())
        }) {
            flavor.vendor = vendor;
        }

        // Distributions sometimes rewrite both strings; fall back on the
        // major version.
        if flavor.vendor == Vendor::Unknown {
            flavor.vendor = match flavor.version.major() {
                10 | 11 => Vendor::MariaDb,
                5 | 8 | 9 => Vendor::MySql,
                _ => Vendor::Unknown,
            };
        }
        flavor
    }

    /// Returns a copy with the patch version zeroed.
    #[must_use]
    pub const fn family(mut self) -> Self {
        self.version.0[2] = 0;
        self
    }

    /// Returns true if all of the supplied variant flags are present.
    #[must_use]
    pub const fn has_variant(self, variant: Variant) -> bool {
        self.variants.contains(variant)
    }

    /// MySQL at or above the given version parts.
    #[must_use]
    pub fn min_mysql(self, parts: &[u16]) -> bool {
        self.vendor == Vendor::MySql && self.version.at_least_parts(parts)
    }

    /// MariaDB at or above the given version parts.
    #[must_use]
    pub fn min_mariadb(self, parts: &[u16]) -> bool {
        self.vendor == Vendor::MariaDb && self.version.at_least_parts(parts)
    }

    /// MySQL whose version matches the supplied parts (none = any version).
    #[must_use]
    pub fn is_mysql(self, parts: &[u16]) -> bool {
        self.vendor == Vendor::MySql && self.version.matches_parts(parts)
    }

    /// MariaDB whose version matches the supplied parts (none = any version).
    #[must_use]
    pub fn is_mariadb(self, parts: &[u16]) -> bool {
        self.vendor == Vendor::MariaDb && self.version.matches_parts(parts)
    }

    /// Like [`Flavor::is_mysql`], additionally requiring Percona.
    #[must_use]
    pub fn is_percona(self, parts: &[u16]) -> bool {
        self.has_variant(Variant::PERCONA) && self.is_mysql(parts)
    }

    /// Like [`Flavor::is_mysql`], additionally requiring Aurora.
    #[must_use]
    pub fn is_aurora(self, parts: &[u16]) -> bool {
        self.has_variant(Variant::AURORA) && self.is_mysql(parts)
    }

    /// True if the major.minor version is newer than the latest release known
    /// to this crate. Always false for unknown vendors.
    #[must_use]
    pub const fn too_new(self) -> bool {
        let mut comparison = match self.vendor {
            Vendor::MySql => LATEST_MYSQL_VERSION,
            Vendor::MariaDb => LATEST_MARIADB_VERSION,
            Vendor::Unknown => return false,
        };
        comparison.0[1] += 1;
        comparison.0[2] = 0;
        self.version.at_least(comparison)
    }

    /// True if the vendor is known and the version is not older than the
    /// oldest supported release.
    #[must_use]
    pub const fn known(self) -> bool {
        match self.vendor {
            Vendor::MySql => self.version.at_least(OLDEST_SUPPORTED_MYSQL_VERSION),
            Vendor::MariaDb => self.version.at_least(OLDEST_SUPPORTED_MARIADB_VERSION),
            Vendor::Unknown => false,
        }
    }

    // ------------------------------------------------------------
    // Capabilities
    // ------------------------------------------------------------

    /// Generated columns with MySQL's native syntax.
    #[must_use]
    pub fn generated_columns(self) -> bool {
        self.min_mysql(&[5, 7]) || self.min_mariadb(&[10, 2])
    }

    /// SHOW CREATE TABLE sorts foreign keys by name.
    #[must_use]
    pub fn sorted_foreign_keys(self) -> bool {
        !self.is_mysql(&[5, 5]) && !self.min_mysql(&[8, 0, 19])
    }

    /// Int-family column types are shown without display width (other than
    /// `tinyint(1)`).
    #[must_use]
    pub fn omit_int_display_width(self) -> bool {
        self.min_mysql(&[8, 0, 19])
    }

    /// Check constraints are supported and exposed in information_schema.
    #[must_use]
    pub fn has_check_constraints(self) -> bool {
        if self.min_mysql(&[8, 0, 16]) || self.min_mariadb(&[10, 3, 10]) {
            return true;
        }
        self.is_mariadb(&[10, 2]) && self.version.patch() >= 22
    }

    /// A COLLATE clause always follows a CHARACTER SET clause in SHOW CREATE
    /// TABLE (MariaDB releases from Nov 2022 onward).
    #[must_use]
    pub fn always_show_collate(self) -> bool {
        self.is_mariadb(&[]) && MARIA_ALWAYS_COLLATE.check(self.version)
    }

    /// Opening of the version-gated comment wrapping a column compression
    /// clause. Never empty, even for flavors without column compression.
    #[must_use]
    pub fn compressed_column_open_comment(self) -> &'static str {
        if !self.is_mariadb(&[]) {
            "/*!50633 "
        } else if MARIA_NEW_COMPRESSED_COL_MARKER.check(self.version) {
            "/*M!100301 "
        } else {
            "/*!100301 "
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.variants.is_none() {
            write!(f, "{}", self.vendor)?;
        } else {
            write!(f, "{}", self.variants)?;
        }
        let v = self.version;
        if v.patch() > 0 {
            write!(f, ":{}.{}.{}", v.major(), v.minor(), v.patch())
        } else {
            write!(f, ":{}.{}", v.major(), v.minor())
        }
    }
}

impl FromStr for Flavor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for Flavor {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Flavor> for String {
    fn from(flavor: Flavor) -> Self {
        flavor.to_string()
    }
}

// ================================================================
// Point-release maps
// ================================================================

/// Answers "does this exact version have the feature" for features that
/// shipped in specific point releases of several minor series at once.
///
/// Built from one threshold version per minor series. Versions below the
/// lowest series never have the feature, versions at or above the highest
/// threshold always do, and anything in between needs an entry for its
/// major.minor with a sufficient patch.
#[derive(Debug, Clone, Default)]
pub struct PointReleaseMap {
    always_false_below: Version,
    always_true_at_least: Version,
    conditionals: HashMap<u64, u16>,
}

impl PointReleaseMap {
    /// Builds a map from per-series threshold versions.
    #[must_use]
    pub fn new(versions: &[Version]) -> Self {
        let mut prm = Self {
            conditionals: HashMap::with_capacity(versions.len()),
            ..Self::default()
        };
        let mut min_packed = 0;
        let mut max_packed = 0;
        for (n, ver) in versions.iter().enumerate() {
            let packed = ver.pack_major_minor();
            if n == 0 || packed < min_packed {
                prm.always_false_below = *ver;
                min_packed = packed;
            }
            if packed > max_packed {
                prm.always_true_at_least = *ver;
                max_packed = packed;
            }
            prm.conditionals.insert(packed, ver.patch());
        }
        prm
    }

    /// Returns true if `ver` has the feature.
    #[must_use]
    pub fn check(&self, ver: Version) -> bool {
        if self.conditionals.is_empty() || ver.below(self.always_false_below) {
            return false;
        }
        if ver.at_least(self.always_true_at_least) {
            return true;
        }
        self.conditionals
            .get(&ver.pack_major_minor())
            .is_some_and(|min_patch| ver.patch() >= *min_patch)
    }
}

/// MariaDB releases that always show COLLATE after CHARACTER SET.
static MARIA_ALWAYS_COLLATE: LazyLock<PointReleaseMap> = LazyLock::new(|| {
    PointReleaseMap::new(&[
        Version::new(10, 3, 37),
        Version::new(10, 4, 27),
        Version::new(10, 5, 18),
        Version::new(10, 6, 11),
        Version::new(10, 7, 7),
        Version::new(10, 8, 6),
        Version::new(10, 9, 4),
        Version::new(10, 10, 2),
    ])
});

/// MariaDB releases using `/*M!` for compressed column markers.
static MARIA_NEW_COMPRESSED_COL_MARKER: LazyLock<PointReleaseMap> = LazyLock::new(|| {
    PointReleaseMap::new(&[
        Version::new(10, 5, 26),
        Version::new(10, 6, 19),
        Version::new(10, 11, 9),
        Version::new(11, 1, 6),
        Version::new(11, 2, 5),
        Version::new(11, 4, 3),
        Version::new(11, 5, 2),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    fn mysql(major: u16, minor: u16, patch: u16) -> Flavor {
        Flavor::new(Vendor::MySql, major, minor, patch)
    }

    fn maria(major: u16, minor: u16, patch: u16) -> Flavor {
        Flavor::new(Vendor::MariaDb, major, minor, patch)
    }

    #[test]
    fn parse_version_strips_prefix_and_suffix() {
        assert_eq!(Version::parse("5.7.44-log"), Ok(Version::new(5, 7, 44)));
        assert_eq!(Version::parse("v8.0.36"), Ok(Version::new(8, 0, 36)));
        assert_eq!(
            Version::parse("10.11.6-MariaDB-1:10.11.6+maria~ubu2204"),
            Ok(Version::new(10, 11, 6))
        );
        assert_eq!(Version::parse("8.4"), Ok(Version::new(8, 4, 0)));
    }

    #[test]
    fn parse_version_keeps_partial_result_on_error() {
        let err = Version::parse("8.x.2").unwrap_err();
        assert_eq!(err.part, "x");
        assert_eq!(err.partial, Version::new(8, 0, 2));
        assert_eq!(Version::parse_lenient("8.x.2"), Version::new(8, 0, 2));
        assert_eq!(Version::parse_lenient(""), Version::default());
    }

    #[test]
    fn version_comparisons() {
        let v = Version::new(8, 0, 19);
        assert!(v.at_least(Version::new(8, 0, 19)));
        assert!(v.below(Version::new(8, 0, 20)));
        assert!(v.at_least_parts(&[8]));
        assert!(!v.at_least_parts(&[8, 1]));
        assert!(v.matches_parts(&[8, 0]));
        assert!(v.matches_parts(&[]));
        assert!(!v.matches_parts(&[8, 0, 18]));
        assert_eq!(v.to_string(), "8.0.19");
    }

    #[test]
    fn parse_flavor_strings() {
        assert_eq!(Flavor::parse("mysql:8.0.34"), mysql(8, 0, 34));
        assert_eq!(Flavor::parse("mariadb:10.6"), maria(10, 6, 0));
        let percona = Flavor::parse("percona:5.7");
        assert_eq!(percona.vendor, Vendor::MySql);
        assert!(percona.has_variant(Variant::PERCONA));
        assert_eq!(Flavor::parse("postgres:14").vendor, Vendor::Unknown);
        assert_eq!(Flavor::parse("garbage"), FLAVOR_UNKNOWN);
    }

    #[test]
    fn flavor_display_round_trips() {
        assert_eq!(mysql(8, 0, 34).to_string(), "mysql:8.0.34");
        assert_eq!(maria(10, 6, 0).to_string(), "mariadb:10.6");
        assert_eq!(
            mysql(5, 7, 0).with_variants(Variant::PERCONA).to_string(),
            "percona:5.7"
        );
        assert_eq!(FLAVOR_UNKNOWN.to_string(), "unknown:0.0");
        assert_eq!(mysql(8, 0, 34).family(), mysql(8, 0, 0));
    }

    #[test]
    fn split_versioned_identifier_with_label() {
        let (name, version, label) = split_versioned_identifier("mysql:8.0.36-debug");
        assert_eq!(name, "mysql");
        assert_eq!(version, Version::new(8, 0, 36));
        assert_eq!(label, "debug");
        let (name, version, label) = split_versioned_identifier("mysql");
        assert_eq!((name, version, label), ("mysql", Version::default(), ""));
    }

    #[test]
    fn variant_parsing_and_display() {
        let both = Variant::parse("percona-aurora");
        assert!(both.contains(Variant::PERCONA));
        assert!(both.contains(Variant::AURORA));
        assert_eq!(both.to_string(), "percona-aurora");
        assert!(Variant::parse("tidb").is_none());
    }

    #[test]
    fn identify_flavor_from_server_vars() {
        let f = Flavor::identify("5.7.30-33", "Percona Server (GPL), Release 33");
        assert!(f.is_percona(&[5, 7]));
        let f = Flavor::identify("10.6.12-MariaDB", "mariadb.org binary distribution");
        assert_eq!(f, maria(10, 6, 12));
        let f = Flavor::identify("8.0.36", "MySQL Community Server - GPL");
        assert_eq!(f, mysql(8, 0, 36));
        assert_eq!(Flavor::identify("11.2.2", "").vendor, Vendor::MariaDb);
        assert_eq!(Flavor::identify("9.0.1", "").vendor, Vendor::MySql);
        assert_eq!(Flavor::identify("3.1.0", "").vendor, Vendor::Unknown);
    }

    #[test]
    fn min_and_is_predicates() {
        let f = mysql(8, 0, 19);
        assert!(f.min_mysql(&[8]));
        assert!(f.min_mysql(&[8, 0, 19]));
        assert!(!f.min_mysql(&[8, 0, 20]));
        assert!(!f.min_mariadb(&[5]));
        assert!(f.is_mysql(&[]));
        assert!(f.is_mysql(&[8, 0]));
        assert!(!f.is_mariadb(&[]));
        assert!(!f.is_percona(&[]));
    }

    #[test]
    fn too_new_and_known() {
        assert!(!mysql(9, 1, 5).too_new());
        assert!(mysql(9, 2, 0).too_new());
        assert!(!maria(11, 5, 2).too_new());
        assert!(maria(11, 6, 0).too_new());
        assert!(!FLAVOR_UNKNOWN.too_new());
        assert!(mysql(5, 5, 0).known());
        assert!(!mysql(5, 1, 0).known());
        assert!(!maria(10, 0, 38).known());
        assert!(!FLAVOR_UNKNOWN.known());
    }

    #[test]
    fn capability_predicates() {
        assert!(mysql(5, 7, 0).generated_columns());
        assert!(!mysql(5, 6, 0).generated_columns());
        assert!(maria(10, 2, 0).generated_columns());

        assert!(!mysql(5, 5, 60).sorted_foreign_keys());
        assert!(mysql(8, 0, 18).sorted_foreign_keys());
        assert!(!mysql(8, 0, 19).sorted_foreign_keys());
        assert!(maria(10, 6, 0).sorted_foreign_keys());

        assert!(mysql(8, 0, 19).omit_int_display_width());
        assert!(!mysql(8, 0, 18).omit_int_display_width());

        assert!(mysql(8, 0, 16).has_check_constraints());
        assert!(!mysql(8, 0, 15).has_check_constraints());
        assert!(maria(10, 2, 22).has_check_constraints());
        assert!(!maria(10, 2, 21).has_check_constraints());
        assert!(maria(10, 3, 10).has_check_constraints());
        assert!(!maria(10, 3, 9).has_check_constraints());
    }

    #[test]
    fn always_show_collate_point_releases() {
        assert!(!maria(10, 2, 44).always_show_collate());
        assert!(!maria(10, 3, 36).always_show_collate());
        assert!(maria(10, 3, 37).always_show_collate());
        assert!(!maria(10, 6, 10).always_show_collate());
        assert!(maria(10, 6, 11).always_show_collate());
        assert!(maria(10, 10, 2).always_show_collate());
        assert!(maria(11, 0, 0).always_show_collate());
        assert!(!mysql(8, 0, 36).always_show_collate());
    }

    #[test]
    fn compressed_column_markers() {
        assert_eq!(mysql(5, 7, 0).compressed_column_open_comment(), "/*!50633 ");
        assert_eq!(maria(10, 6, 18).compressed_column_open_comment(), "/*!100301 ");
        assert_eq!(maria(10, 6, 19).compressed_column_open_comment(), "/*M!100301 ");
        // 10.7 through 10.10 never received the new marker
        assert_eq!(maria(10, 8, 8).compressed_column_open_comment(), "/*!100301 ");
        assert_eq!(maria(11, 6, 0).compressed_column_open_comment(), "/*M!100301 ");
    }

    #[test]
    fn empty_point_release_map_is_always_false() {
        let prm = PointReleaseMap::new(&[]);
        assert!(!prm.check(Version::new(99, 0, 0)));
    }

    #[test]
    fn flavor_serde_uses_string_form() {
        let json = serde_json::to_string(&mysql(8, 0, 34)).unwrap();
        assert_eq!(json, "\"mysql:8.0.34\"");
        let back: Flavor = serde_json::from_str("\"mariadb:10.11.6\"").unwrap();
        assert_eq!(back, maria(10, 11, 6));
    }
}
