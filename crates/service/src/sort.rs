//! Sort option parsing for list endpoints.
//!
//! Clients send `sortBy=field:asc|desc`; each service resolves the field
//! against its own column whitelist so arbitrary strings never reach the ORM.

use sea_orm::Order;

use crate::errors::ServiceError;

/// Resolve an optional `field:order` string against an allowed column table.
/// Returns the default when no sort was requested; unknown fields or orders
/// are a validation error.
pub fn resolve<C: Copy>(
    raw: Option<&str>,
    allowed: &[(&str, C)],
    default: (C, Order),
) -> Result<(C, Order), ServiceError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return Ok(default),
    };

    let (field, order) = raw
        .split_once(':')
        .ok_or_else(|| ServiceError::Validation("sortBy must be field:(asc|desc)".into()))?;

    let order = match order {
        "asc" => Order::Asc,
        "desc" => Order::Desc,
        _ => return Err(ServiceError::Validation("sort order must be asc or desc".into())),
    };

    let column = allowed
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, col)| *col)
        .ok_or_else(|| {
            let names: Vec<&str> = allowed.iter().map(|(name, _)| *name).collect();
            ServiceError::Validation(format!("cannot sort by {field}; allowed: {}", names.join(", ")))
        })?;

    Ok((column, order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Col {
        Name,
        CreatedAt,
    }

    const ALLOWED: &[(&str, Col)] = &[("name", Col::Name), ("createdAt", Col::CreatedAt)];

    #[test]
    fn parses_field_and_order() {
        let (col, order) = resolve(Some("name:asc"), ALLOWED, (Col::CreatedAt, Order::Desc)).unwrap();
        assert_eq!(col, Col::Name);
        assert!(matches!(order, Order::Asc));
    }

    #[test]
    fn falls_back_to_default() {
        let (col, order) = resolve(None, ALLOWED, (Col::CreatedAt, Order::Desc)).unwrap();
        assert_eq!(col, Col::CreatedAt);
        assert!(matches!(order, Order::Desc));

        let (col, _) = resolve(Some("  "), ALLOWED, (Col::CreatedAt, Order::Desc)).unwrap();
        assert_eq!(col, Col::CreatedAt);
    }

    #[test]
    fn rejects_unknown_field() {
        assert!(resolve(Some("password:asc"), ALLOWED, (Col::Name, Order::Asc)).is_err());
    }

    #[test]
    fn rejects_bad_order_and_syntax() {
        assert!(resolve(Some("name:upwards"), ALLOWED, (Col::Name, Order::Asc)).is_err());
        assert!(resolve(Some("name"), ALLOWED, (Col::Name, Order::Asc)).is_err());
    }
}
