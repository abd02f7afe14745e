use std::fmt;
use std::str::FromStr;

use super::ParseMappingError;

/// Whether a [`Mapping`] names a user or a group.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MappingType {
    /// A single user account.
    User,
    /// A group of users.
    Group,
}

impl MappingType {
    /// Lowercase tag used in the textual `type:id` form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject of a permission or management rule: a user or a group id.
///
/// Groups sort after users so ordered collections list user rows first.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mapping {
    kind: MappingType,
    id: String,
}

impl Mapping {
    /// Creates a mapping of the given type.
    #[must_use]
    pub fn new(kind: MappingType, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Creates a user mapping.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(MappingType::User, id)
    }

    /// Creates a group mapping.
    #[must_use]
    pub fn group(id: impl Into<String>) -> Self {
        Self::new(MappingType::Group, id)
    }

    /// Returns the mapping type.
    #[must_use]
    pub const fn kind(&self) -> MappingType {
        self.kind
    }

    /// Returns the user or group id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` for user mappings.
    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.kind, MappingType::User)
    }

    /// Returns `true` for group mappings.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, MappingType::Group)
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for Mapping {
    type Err = ParseMappingError;

    /// Accepts `user:<id>`, `group:<id>` and the shorthand `@<group>`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Some(group) = trimmed.strip_prefix('@') {
            return non_empty(group, input).map(Self::group);
        }

        let (kind, id) = trimmed
            .split_once(':')
            .ok_or_else(|| ParseMappingError::MissingSeparator(input.to_owned()))?;
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "user" => MappingType::User,
            "group" => MappingType::Group,
            other => return Err(ParseMappingError::UnknownType(other.to_owned())),
        };
        non_empty(id, input).map(|id| Self::new(kind, id))
    }
}

fn non_empty<'a>(id: &'a str, input: &str) -> Result<&'a str, ParseMappingError> {
    let id = id.trim();
    if id.is_empty() {
        Err(ParseMappingError::EmptyId(input.to_owned()))
    } else {
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_and_shorthand_forms() {
        assert_eq!("user:alice".parse::<Mapping>().unwrap(), Mapping::user("alice"));
        assert_eq!("Group: staff".parse::<Mapping>().unwrap(), Mapping::group("staff"));
        assert_eq!("@admins".parse::<Mapping>().unwrap(), Mapping::group("admins"));
    }

    #[test]
    fn rejects_malformed_mappings() {
        assert!(matches!(
            "alice".parse::<Mapping>(),
            Err(ParseMappingError::MissingSeparator(_))
        ));
        assert!(matches!(
            "role:alice".parse::<Mapping>(),
            Err(ParseMappingError::UnknownType(_))
        ));
        assert!(matches!(
            "user:".parse::<Mapping>(),
            Err(ParseMappingError::EmptyId(_))
        ));
        assert!(matches!("@".parse::<Mapping>(), Err(ParseMappingError::EmptyId(_))));
    }

    #[test]
    fn display_uses_type_prefix() {
        assert_eq!(Mapping::group("staff").to_string(), "group:staff");
        assert_eq!(Mapping::user("bob").to_string(), "user:bob");
    }

    #[test]
    fn users_order_before_groups() {
        let mut mappings = vec![Mapping::group("a"), Mapping::user("z")];
        mappings.sort();
        assert!(mappings[0].is_user());
        assert!(mappings[1].is_group());
    }
}
