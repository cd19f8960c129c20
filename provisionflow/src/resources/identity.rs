//! Decomposition of outpost resource ARNs.

use crate::errors::ValidationError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const ARN_PATTERN: &str = r"^arn:(?P<partition>[a-z0-9-]+):s3-outposts:(?P<region>[a-z0-9-]+):(?P<account>\d{12}):outpost/(?P<outpost>[A-Za-z0-9-]+)/(?P<kind>bucket|accesspoint)/(?P<name>[A-Za-z0-9.-]+)$";

fn arn_regex() -> &'static Regex {
    static ARN_REGEX: OnceLock<Regex> = OnceLock::new();
    ARN_REGEX.get_or_init(|| Regex::new(ARN_PATTERN).expect("arn regex is valid"))
}

/// The kind of resource an ARN names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArnKind {
    /// An outpost bucket.
    Bucket,
    /// An outpost access point.
    AccessPoint,
}

impl ArnKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::AccessPoint => "accesspoint",
        }
    }
}

/// A parsed outpost resource identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceArn {
    /// Partition, e.g. `aws`.
    pub partition: String,
    /// Region.
    pub region: String,
    /// Twelve digit account id.
    pub account: String,
    /// Outpost id.
    pub outpost_id: String,
    /// Resource kind.
    pub kind: ArnKind,
    /// Bucket or access point name.
    pub name: String,
}

impl ResourceArn {
    /// Parses an ARN.
    pub fn parse(arn: &str) -> Result<Self, ValidationError> {
        let caps = arn_regex()
            .captures(arn.trim())
            .ok_or_else(|| ValidationError::new("Arn", format!("is not an outpost resource ARN: {arn}")))?;

        let kind = match &caps["kind"] {
            "bucket" => ArnKind::Bucket,
            _ => ArnKind::AccessPoint,
        };

        Ok(Self {
            partition: caps["partition"].to_string(),
            region: caps["region"].to_string(),
            account: caps["account"].to_string(),
            outpost_id: caps["outpost"].to_string(),
            kind,
            name: caps["name"].to_string(),
        })
    }

    /// Parses an ARN and checks it names the expected kind.
    pub fn parse_kind(arn: &str, kind: ArnKind) -> Result<Self, ValidationError> {
        let parsed = Self::parse(arn)?;
        if parsed.kind != kind {
            return Err(ValidationError::new(
                "Arn",
                format!("names a {}, expected a {}", parsed.kind.as_str(), kind.as_str()),
            ));
        }
        Ok(parsed)
    }
}

impl fmt::Display for ResourceArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:s3-outposts:{}:{}:outpost/{}/{}/{}",
            self.partition,
            self.region,
            self.account,
            self.outpost_id,
            self.kind.as_str(),
            self.name
        )
    }
}

/// Composes the identity of an access point from its bucket's identity.
pub fn access_point_arn(bucket_arn: &str, name: &str) -> Result<String, ValidationError> {
    let bucket = ResourceArn::parse_kind(bucket_arn, ArnKind::Bucket)?;
    let access_point = ResourceArn {
        kind: ArnKind::AccessPoint,
        name: name.to_string(),
        ..bucket
    };
    Ok(access_point.to_string())
}
