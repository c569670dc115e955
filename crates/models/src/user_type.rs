use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The role a user authenticates as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserType {
    Student,
    Teacher,
    Admin,
}

impl UserType {
    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

#[cfg(test)]
mod test {
    use crate::user_type::UserType;
    use std::str::FromStr;

    #[test]
    fn test_user_type_from_str() {
        assert_eq!(UserType::from_str("student").unwrap(), UserType::Student);
        assert_eq!(UserType::from_str("admin").unwrap(), UserType::Admin);
        assert!(UserType::from_str("janitor").is_err());
    }

    #[test]
    fn test_user_type_serde_matches_display() {
        let json = serde_json::to_string(&UserType::Teacher).unwrap();
        assert_eq!(json, format!("\"{}\"", UserType::Teacher));
    }
}
