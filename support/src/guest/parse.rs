use std::{fmt::Display, str::FromStr};

use crate::guest::{Argument, ArgumentError};

fn find<'a>(args: &'a [Argument], name: &str) -> Option<&'a str> {
    args.iter()
        .find(|arg| arg.name == name)
        .map(|arg| arg.value.as_str())
}

/// Parse an argument which must be provided.
pub fn required_arg<T>(
    args: &[Argument],
    name: &str,
) -> Result<T, ArgumentError>
where
    T: FromStr,
    T::Err: Display,
{
    optional_arg(args, name)?.ok_or_else(|| ArgumentError::not_found(name))
}

/// Parse an argument, returning `None` if it wasn't provided.
///
/// An argument set to the empty string is treated as not provided.
pub fn optional_arg<T>(
    args: &[Argument],
    name: &str,
) -> Result<Option<T>, ArgumentError>
where
    T: FromStr,
    T::Err: Display,
{
    match find(args, name) {
        Some(value) if !value.is_empty() => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ArgumentError::invalid_value(name, e)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guest::ArgumentErrorReason;

    #[test]
    fn parse_known_arguments() {
        let args = vec![Argument::new("maxlen", 7), Argument::new("side", "")];

        let maxlen: usize = required_arg(&args, "maxlen").unwrap();
        let side: Option<String> = optional_arg(&args, "side").unwrap();
        let missing: Option<u32> = optional_arg(&args, "missing").unwrap();

        assert_eq!(maxlen, 7);
        assert_eq!(side, None);
        assert_eq!(missing, None);
    }

    #[test]
    fn missing_required_argument() {
        let err = required_arg::<usize>(&[], "maxlen").unwrap_err();

        assert_eq!(err, ArgumentError::not_found("maxlen"));
    }

    #[test]
    fn unparseable_argument() {
        let args = vec![Argument::new("maxlen", "seven")];

        let err = required_arg::<usize>(&args, "maxlen").unwrap_err();

        assert!(matches!(err.reason, ArgumentErrorReason::InvalidValue(_)));
    }
}
