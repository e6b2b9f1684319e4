//! Wire-name conversions for fieldless enums
//!
//! Enums that travel through configuration files and JSON bodies use
//! `snake_case` names. The macro below generates `Display` and a
//! case-insensitive `FromStr` from one mapping table.
//!
//! ```rust
//! use campus_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Role {
//!     Student,
//!     Teacher,
//! }
//!
//! impl_wire_name_conversions!(Role {
//!     Student => "student",
//!     Teacher => "teacher",
//! });
//!
//! assert_eq!(Role::Teacher.to_string(), "teacher");
//! assert_eq!("STUDENT".parse::<Role>(), Ok(Role::Student));
//! ```

/// Implements `Display` and `FromStr` for a fieldless enum.
///
/// Parsing lowercases the input first, so mapping strings must be lowercase.
/// Unknown input yields `Err(String)` naming the enum.
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Term {
        Spring,
        Autumn,
    }

    impl_wire_name_conversions!(Term {
        Spring => "spring",
        Autumn => "autumn",
    });

    #[test]
    fn display_uses_mapping() {
        assert_eq!(Term::Spring.to_string(), "spring");
        assert_eq!(format!("{:>8}", Term::Autumn.to_string()), "  autumn");
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(Term::from_str(" Autumn ").unwrap(), Term::Autumn);
        assert_eq!(Term::from_str("SPRING").unwrap(), Term::Spring);
    }

    #[test]
    fn parsing_unknown_names_fails() {
        let err = Term::from_str("winter").unwrap_err();
        assert!(err.contains("Invalid Term: winter"));
        assert!(Term::from_str("").is_err());
    }
}
