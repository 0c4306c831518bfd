use std::fmt;
use std::str::FromStr;

/// Users are owned by the authentication service; this side only ever stores their id.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct UserID(pub i64);

impl From<i64> for UserID {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<UserID> for i64 {
    fn from(v: UserID) -> Self {
        v.0
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserID {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}
